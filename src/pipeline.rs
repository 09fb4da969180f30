//! Runs the whole analysis in order: load, enrich, then summarise and plot.

use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{arrivals_by_day, count_matching, histogram, metric_values};
use crate::config::AnalysisConfig;
use crate::enrich::{EnrichmentSummary, enrich_trips};
use crate::error::{BikeshareError, Result};
use crate::plot::{bike_route, plot_histogram, plot_route};
use crate::report::ArrivalReport;
use crate::stations::load_stations;
use crate::trip::{Metric, Trip, TripField, load_trips};

/// What a run produced, for logging and tests.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub trips: usize,
    pub stations: usize,
    pub enrichment: EnrichmentSummary,
    pub arrivals: IndexMap<String, usize>,
    pub bike_rides: usize,
}

/// Executes every step against `config`, writing the text report to `out`.
///
/// The first failure aborts the run; artifacts written before it are kept.
#[tracing::instrument(skip_all, fields(trips = %config.trips_path.display()))]
pub fn run(config: &AnalysisConfig, out: &mut impl Write) -> Result<RunSummary> {
    config.validate()?;

    let mut trips = load_trips(&config.trips_path)?;
    let stations = load_stations(&config.stations_path)?;
    info!(trips = trips.len(), stations = stations.len(), "Inputs loaded");

    let enrichment = enrich_trips(&mut trips, &stations, &config.great_circle());
    info!(
        enriched = enrichment.enriched,
        station_misses = enrichment.station_misses,
        non_positive_durations = enrichment.non_positive_durations,
        "Trips enriched"
    );

    render_metric(config, &trips, Metric::Distance, &config.distance_plot)?;
    render_metric(config, &trips, Metric::Speed, &config.speed_plot)?;

    let arrivals = arrivals_by_day(&trips, &config.target_end_station)?;
    let report = ArrivalReport::new(&config.target_end_station, arrivals);
    writeln!(out, "{}", report.render_text()?).map_err(|e| BikeshareError::io("<report>", e))?;
    report.write_json(config.output_path(&config.report_file))?;

    let bike_rides = count_matching(&trips, &TripField::BikeId, &config.bike_id)?;
    info!(bike_id = %config.bike_id, rides = bike_rides, "Rides for designated bike");
    let route = bike_route(&trips, &stations, &config.bike_id)?;
    plot_route(
        config.output_path(&config.route_plot),
        &route,
        &format!("Rides of bike {}", config.bike_id),
    )?;

    Ok(RunSummary {
        trips: trips.len(),
        stations: stations.len(),
        enrichment,
        arrivals: report.counts,
        bike_rides,
    })
}

fn render_metric(
    config: &AnalysisConfig,
    trips: &[Trip],
    metric: Metric,
    file_name: &str,
) -> Result<()> {
    let values = metric_values(trips, metric);
    let bins = histogram(&values, config.histogram_bins);
    plot_histogram(
        config.output_path(file_name),
        &bins,
        metric.name(),
        &format!("Frequency of trip {}s", metric.name()),
    )
}
