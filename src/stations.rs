//! Station coordinate table loaded from `name,latitude,longitude` rows.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{BikeshareError, Result};
use crate::parser::{delimited_reader, line_fields, line_of};

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Station name to coordinate lookup. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    entries: HashMap<String, Coordinate>,
}

impl StationTable {
    pub fn get(&self, name: &str) -> Option<&Coordinate> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Coordinate)> for StationTable {
    /// Later entries replace earlier ones with the same name.
    fn from_iter<I: IntoIterator<Item = (K, Coordinate)>>(iter: I) -> Self {
        StationTable {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Opens `path` and parses it with [`parse_stations`].
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_stations(path: impl AsRef<Path>) -> Result<StationTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| BikeshareError::io(path, e))?;
    let table = parse_stations(file)?;
    debug!(stations = table.len(), "Loaded station table");
    Ok(table)
}

/// Reads station rows. The first line is skipped without being interpreted,
/// whitespace around each line is dropped, columns past the third are ignored
/// and a repeated name overwrites the earlier coordinate.
pub fn parse_stations<R: Read>(reader: R) -> Result<StationTable> {
    let mut rdr = delimited_reader(reader);
    let mut entries = HashMap::new();

    for row in rdr.records().skip(1) {
        let row = row?;
        let line = line_of(&row);
        let fields = line_fields(&row);

        let column = |index: usize, name: &'static str| {
            fields
                .get(index)
                .copied()
                .ok_or(BikeshareError::MissingColumn { line, index, name })
        };
        let degrees = |index: usize, name: &'static str| -> Result<f64> {
            let raw = column(index, name)?;
            raw.trim().parse::<f64>().map_err(|e| BikeshareError::Format {
                field: name.to_string(),
                value: raw.to_string(),
                line,
                reason: e.to_string(),
            })
        };

        let station = column(0, "name")?.to_string();
        let latitude = degrees(1, "latitude")?;
        let longitude = degrees(2, "longitude")?;
        entries.insert(station, Coordinate::new(latitude, longitude));
    }

    Ok(StationTable { entries })
}
