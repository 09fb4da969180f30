//! Joins trips against the station table and derives distance and speed.

use serde::Serialize;

use crate::distance::GreatCircle;
use crate::stations::StationTable;
use crate::trip::{Trip, TripMetrics};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Outcome counts of one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentSummary {
    pub enriched: usize,
    /// Trips whose start or end station is not in the table.
    pub station_misses: usize,
    /// Trips with both stations known but a duration of zero or less.
    pub non_positive_durations: usize,
}

impl EnrichmentSummary {
    pub fn total(&self) -> usize {
        self.enriched + self.station_misses + self.non_positive_durations
    }
}

/// Computes the metrics of a single trip, or `None` when they are undefined.
pub fn trip_metrics(trip: &Trip, stations: &StationTable, calc: &GreatCircle) -> Option<TripMetrics> {
    let start = stations.get(&trip.start_station)?;
    let end = stations.get(&trip.end_station)?;
    if trip.duration_secs <= 0 {
        return None;
    }

    let distance_miles = calc.distance(start, end);
    let hours = trip.duration_secs as f64 / SECONDS_PER_HOUR;
    Some(TripMetrics {
        distance_miles,
        speed_mph: distance_miles / hours,
    })
}

/// Sets `metrics` on every trip in place and reports what happened.
///
/// A trip referencing an unknown station, or one with a non-positive
/// duration, ends up with `metrics == None`; nothing is dropped and no error is
/// raised. Running the pass again with the same table produces the same metrics.
pub fn enrich_trips(
    trips: &mut [Trip],
    stations: &StationTable,
    calc: &GreatCircle,
) -> EnrichmentSummary {
    let mut summary = EnrichmentSummary::default();

    for trip in trips.iter_mut() {
        trip.metrics = trip_metrics(trip, stations, calc);

        if trip.metrics.is_some() {
            summary.enriched += 1;
        } else if stations.contains(&trip.start_station) && stations.contains(&trip.end_station) {
            summary.non_positive_durations += 1;
        } else {
            summary.station_misses += 1;
        }
    }

    summary
}

/// By-value form of [`enrich_trips`].
pub fn enriched(mut trips: Vec<Trip>, stations: &StationTable, calc: &GreatCircle) -> Vec<Trip> {
    enrich_trips(&mut trips, stations, calc);
    trips
}
