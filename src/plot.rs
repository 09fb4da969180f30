//! SVG rendering of metric histograms and single-bike routes.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::aggregate::HistogramBin;
use crate::error::{BikeshareError, Result};
use crate::stations::{Coordinate, StationTable};
use crate::trip::Trip;

const CANVAS: (u32, u32) = (1280, 760);

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Draws `bins` as adjoining bars. The x axis is labelled `x_label`, the y axis
/// `Frequency`.
pub fn plot_histogram(
    path: impl AsRef<Path>,
    bins: &[HistogramBin],
    x_label: &str,
    title: &str,
) -> Result<()> {
    let path = path.as_ref();
    info!(path = %path.display(), bins = bins.len(), "Rendering histogram");
    draw_histogram(path, bins, x_label, title).map_err(|e| BikeshareError::Plot(e.to_string()))
}

fn draw_histogram(path: &Path, bins: &[HistogramBin], x_label: &str, title: &str) -> DrawResult {
    let root = SVGBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(25)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0usize..(y_max + y_max / 20 + 1))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_label)
        .y_desc("Frequency")
        .x_label_formatter(&|v| format!("{:.1}", v))
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0), (b.upper, b.count)], RGBColor(31, 119, 180).filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Start and end coordinate of one ride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSegment {
    pub start: Coordinate,
    pub end: Coordinate,
}

/// Segments for every trip made by `bike_id`, in trip order.
///
/// # Errors
///
/// Returns [`BikeshareError::UnknownStation`] if one of the bike's trips uses a
/// station that is not in the table.
pub fn bike_route(trips: &[Trip], stations: &StationTable, bike_id: &str) -> Result<Vec<RouteSegment>> {
    let locate = |name: &str| {
        stations
            .get(name)
            .copied()
            .ok_or_else(|| BikeshareError::UnknownStation(name.to_string()))
    };

    trips
        .iter()
        .filter(|t| t.bike_id == bike_id)
        .map(|t| -> Result<RouteSegment> {
            Ok(RouteSegment {
                start: locate(&t.start_station)?,
                end: locate(&t.end_station)?,
            })
        })
        .collect()
}

/// Draws each segment as a dashed line with markers at both ends, longitude on
/// x and latitude on y.
pub fn plot_route(path: impl AsRef<Path>, segments: &[RouteSegment], title: &str) -> Result<()> {
    let path = path.as_ref();
    info!(path = %path.display(), segments = segments.len(), "Rendering route");
    draw_route(path, segments, title).map_err(|e| BikeshareError::Plot(e.to_string()))
}

fn draw_route(path: &Path, segments: &[RouteSegment], title: &str) -> DrawResult {
    let root = SVGBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let points: Vec<Coordinate> = segments.iter().flat_map(|s| [s.start, s.end]).collect();
    let (lon_min, lon_max) = padded_extent(points.iter().map(|c| c.longitude));
    let (lat_min, lat_max) = padded_extent(points.iter().map(|c| c.latitude));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(25)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(lon_min..lon_max, lat_min..lat_max)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .x_label_formatter(&|v| format!("{:.3}", v))
        .y_label_formatter(&|v| format!("{:.3}", v))
        .draw()?;

    for (i, segment) in segments.iter().enumerate() {
        let color = Palette99::pick(i);
        let ends = [
            (segment.start.longitude, segment.start.latitude),
            (segment.end.longitude, segment.end.latitude),
        ];
        chart.draw_series(DashedLineSeries::new(ends, 6, 4, color.stroke_width(2)))?;
        chart.draw_series(ends.map(|p| Circle::new(p, 4, color.filled())))?;
    }

    root.present()?;
    Ok(())
}

/// Min and max of `values` widened by 5% of the span, or a unit range when
/// there is nothing to show.
fn padded_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1e-3);
    (min - pad, max + pad)
}
