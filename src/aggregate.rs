//! Frequency summaries over enriched trips.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::trip::{Metric, Trip, TripField};

/// Counts trips whose `filter` field equals `target`, keyed by their `group`
/// field. Keys appear in the order they are first met; groups with no
/// matching trip are absent.
///
/// # Errors
///
/// Returns [`crate::error::BikeshareError::MissingKey`] when a trip lacks one of
/// the requested fields.
pub fn count_by(
    trips: &[Trip],
    filter: &TripField,
    target: &str,
    group: &TripField,
) -> Result<IndexMap<String, usize>> {
    let mut counts = IndexMap::new();
    for trip in trips {
        if filter.value(trip)? != target {
            continue;
        }
        *counts.entry(group.value(trip)?.into_owned()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Trips ending at `station`, counted by the weekday they started on.
pub fn arrivals_by_day(trips: &[Trip], station: &str) -> Result<IndexMap<String, usize>> {
    count_by(trips, &TripField::EndStation, station, &TripField::StartDayName)
}

/// Number of trips whose `field` equals `value`.
pub fn count_matching(trips: &[Trip], field: &TripField, value: &str) -> Result<usize> {
    let mut count = 0;
    for trip in trips {
        if field.value(trip)? == value {
            count += 1;
        }
    }
    Ok(count)
}

/// The non-empty values of `metric`, in trip order.
pub fn metric_values(trips: &[Trip], metric: Metric) -> Vec<f64> {
    trips.iter().filter_map(|t| metric.of(t)).collect()
}

/// One equal-width histogram bucket covering `[lower, upper)`; the last bucket
/// also includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Splits the finite values into `bins` equal-width buckets spanning their
/// range. A single distinct value gets a unit-wide range centred on it.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for v in finite {
        let index = (((v - min) / width) as usize).min(bins - 1);
        out[index].count += 1;
    }
    out
}
