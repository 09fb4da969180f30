//! Typed trip records built from parsed rows.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{BikeshareError, Result};
use crate::parser::{CastDirectives, FieldCast, FieldValue, Record, read_records};

pub const START_STATION: &str = "start_station";
pub const END_STATION: &str = "end_station";
pub const DURATION: &str = "duration";
pub const START_DAY_NAME: &str = "start_day_name";
pub const BIKE_ID: &str = "bike_id";

/// Distance and average speed of a trip whose stations were both found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripMetrics {
    pub distance_miles: f64,
    pub speed_mph: f64,
}

/// One rental. `metrics` is filled in by enrichment and stays `None` when
/// either station is unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub start_station: String,
    pub end_station: String,
    pub duration_secs: i64,
    pub start_day_name: String,
    pub bike_id: String,
    /// Every other column of the source row.
    pub extra: HashMap<String, FieldValue>,
    pub metrics: Option<TripMetrics>,
}

impl Trip {
    /// Builds a trip from a parsed row, failing with
    /// [`BikeshareError::MissingKey`] when a required column is absent.
    pub fn from_record(mut record: Record) -> Result<Self> {
        let start_station = record.take(START_STATION)?.to_string();
        let end_station = record.take(END_STATION)?.to_string();
        let duration_secs = duration_seconds(record.take(DURATION)?)?;
        let start_day_name = record.take(START_DAY_NAME)?.to_string();
        let bike_id = record.take(BIKE_ID)?.to_string();

        Ok(Trip {
            start_station,
            end_station,
            duration_secs,
            start_day_name,
            bike_id,
            extra: record.into_fields(),
            metrics: None,
        })
    }

    pub fn distance(&self) -> Option<f64> {
        self.metrics.map(|m| m.distance_miles)
    }

    pub fn speed(&self) -> Option<f64> {
        self.metrics.map(|m| m.speed_mph)
    }
}

fn duration_seconds(value: FieldValue) -> Result<i64> {
    let invalid = |value: String, reason: String| BikeshareError::Format {
        field: DURATION.to_string(),
        value,
        line: 0,
        reason,
    };
    match value {
        FieldValue::Integer(secs) => Ok(secs),
        // whole seconds only; i64::MAX as f64 rounds up to 2^63, hence the strict bound
        FieldValue::Float(secs)
            if secs.fract() == 0.0 && secs >= i64::MIN as f64 && secs < i64::MAX as f64 =>
        {
            Ok(secs as i64)
        }
        FieldValue::Float(secs) => Err(invalid(
            secs.to_string(),
            "not a whole number of seconds".to_string(),
        )),
        FieldValue::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| invalid(raw.clone(), e.to_string())),
    }
}

/// Cast directives for the trips file: `duration` becomes integer seconds.
pub fn trip_casts() -> CastDirectives {
    CastDirectives::from([(DURATION.to_string(), FieldCast::Integer)])
}

/// Reads the trips file and converts every row into a [`Trip`].
pub fn load_trips(path: impl AsRef<Path>) -> Result<Vec<Trip>> {
    read_records(path, &trip_casts())?
        .into_iter()
        .map(Trip::from_record)
        .collect()
}

/// A trip column addressed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripField {
    StartStation,
    EndStation,
    Duration,
    StartDayName,
    BikeId,
    Other(String),
}

impl TripField {
    pub fn name(&self) -> &str {
        match self {
            TripField::StartStation => START_STATION,
            TripField::EndStation => END_STATION,
            TripField::Duration => DURATION,
            TripField::StartDayName => START_DAY_NAME,
            TripField::BikeId => BIKE_ID,
            TripField::Other(name) => name,
        }
    }

    /// Reads this field from `trip` as text.
    pub fn value<'a>(&self, trip: &'a Trip) -> Result<Cow<'a, str>> {
        Ok(match self {
            TripField::StartStation => Cow::Borrowed(&trip.start_station),
            TripField::EndStation => Cow::Borrowed(&trip.end_station),
            TripField::Duration => Cow::Owned(trip.duration_secs.to_string()),
            TripField::StartDayName => Cow::Borrowed(&trip.start_day_name),
            TripField::BikeId => Cow::Borrowed(&trip.bike_id),
            TripField::Other(name) => match trip.extra.get(name) {
                Some(FieldValue::Text(s)) => Cow::Borrowed(s),
                Some(other) => Cow::Owned(other.to_string()),
                None => return Err(BikeshareError::MissingKey(name.clone())),
            },
        })
    }
}

impl FromStr for TripField {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            START_STATION => TripField::StartStation,
            END_STATION => TripField::EndStation,
            DURATION => TripField::Duration,
            START_DAY_NAME => TripField::StartDayName,
            BIKE_ID => TripField::BikeId,
            other => TripField::Other(other.to_string()),
        })
    }
}

/// Per-trip quantity produced by enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Distance,
    Speed,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::Distance => "distance",
            Metric::Speed => "speed",
        }
    }

    pub fn of(self, trip: &Trip) -> Option<f64> {
        match self {
            Metric::Distance => trip.distance(),
            Metric::Speed => trip.speed(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parser::parse_records;

    /// Builds an unenriched trip for tests elsewhere in the crate.
    pub(crate) fn trip(start: &str, end: &str, duration_secs: i64, day: &str, bike: &str) -> Trip {
        Trip {
            start_station: start.to_string(),
            end_station: end.to_string(),
            duration_secs,
            start_day_name: day.to_string(),
            bike_id: bike.to_string(),
            extra: HashMap::new(),
            metrics: None,
        }
    }

    const HEADER: &str = "duration,start_time,start_station,end_station,bike_id,user_type,start_day_name";

    #[test]
    fn test_from_record_splits_required_and_extra() {
        let input = format!(
            "{HEADER}\n723,2022-09-25 00:00:11,A St,B St,5800,Subscriber,Sunday\n"
        );
        let record = parse_records(input.as_bytes(), &trip_casts()).unwrap().remove(0);
        let trip = Trip::from_record(record).unwrap();

        assert_eq!(trip.start_station, "A St");
        assert_eq!(trip.end_station, "B St");
        assert_eq!(trip.duration_secs, 723);
        assert_eq!(trip.start_day_name, "Sunday");
        assert_eq!(trip.bike_id, "5800");
        assert_eq!(trip.extra.len(), 2);
        assert_eq!(
            trip.extra.get("user_type"),
            Some(&FieldValue::Text("Subscriber".to_string()))
        );
        assert!(trip.metrics.is_none());
    }

    #[test]
    fn test_from_record_missing_required_field() {
        let input = "start_station,end_station,duration,bike_id\nA,B,60,1\n";
        let record = parse_records(input.as_bytes(), &trip_casts()).unwrap().remove(0);
        let err = Trip::from_record(record).unwrap_err();
        assert!(matches!(err, BikeshareError::MissingKey(k) if k == START_DAY_NAME));
    }

    #[test]
    fn test_uncast_duration_is_parsed() {
        let record: Record = [
            (START_STATION, FieldValue::Text("A".into())),
            (END_STATION, FieldValue::Text("B".into())),
            (DURATION, FieldValue::Text(" 90 ".into())),
            (START_DAY_NAME, FieldValue::Text("Monday".into())),
            (BIKE_ID, FieldValue::Text("7".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(Trip::from_record(record).unwrap().duration_secs, 90);
    }

    #[test]
    fn test_float_duration_must_be_whole_seconds() {
        let record = |secs: f64| -> Record {
            [
                (START_STATION, FieldValue::Text("A".into())),
                (END_STATION, FieldValue::Text("B".into())),
                (DURATION, FieldValue::Float(secs)),
                (START_DAY_NAME, FieldValue::Text("Monday".into())),
                (BIKE_ID, FieldValue::Text("7".into())),
            ]
            .into_iter()
            .collect()
        };

        assert_eq!(Trip::from_record(record(120.0)).unwrap().duration_secs, 120);
        for bad in [90.5, f64::NAN, f64::INFINITY, 1e30] {
            let err = Trip::from_record(record(bad)).unwrap_err();
            assert!(matches!(err, BikeshareError::Format { ref field, .. } if field == DURATION));
        }
    }

    #[test]
    fn test_padded_trip_line() {
        let input = format!("{HEADER}\n  723,2022-09-25 00:00:11,A St,B St,5800,Subscriber,Friday \n");
        let record = parse_records(input.as_bytes(), &trip_casts()).unwrap().remove(0);
        let trip = Trip::from_record(record).unwrap();

        assert_eq!(trip.duration_secs, 723);
        assert_eq!(trip.start_day_name, "Friday");
    }

    #[test]
    fn test_field_lookup() {
        let mut t = trip("A", "B", 60, "Friday", "5800");
        t.extra
            .insert("user_type".to_string(), FieldValue::Text("Customer".into()));

        assert_eq!(TripField::EndStation.value(&t).unwrap(), "B");
        assert_eq!(TripField::Duration.value(&t).unwrap(), "60");
        assert_eq!(
            "user_type".parse::<TripField>().unwrap().value(&t).unwrap(),
            "Customer"
        );
        let err = TripField::Other("gender".into()).value(&t).unwrap_err();
        assert!(matches!(err, BikeshareError::MissingKey(k) if k == "gender"));
    }

    #[test]
    fn test_field_names_round_trip_through_from_str() {
        for name in [START_STATION, END_STATION, DURATION, START_DAY_NAME, BIKE_ID, "zip"] {
            assert_eq!(name.parse::<TripField>().unwrap().name(), name);
        }
        assert_eq!("bike_id".parse::<TripField>().unwrap(), TripField::BikeId);
    }
}
