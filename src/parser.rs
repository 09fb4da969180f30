//! Comma-delimited reader producing one [`Record`] per data row.
//!
//! The first line is always the header. Fields are split on `,` with no quoting
//! or escaping, so a value can never contain the delimiter.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::debug;

use crate::error::{BikeshareError, Result};

/// A single parsed field. Columns without a cast directive stay [`FieldValue::Text`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Coercion applied to a column at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCast {
    Integer,
    Float,
    Text,
}

impl FieldCast {
    /// Converts the raw text of a field. Numeric casts ignore surrounding whitespace.
    pub fn apply(self, raw: &str) -> std::result::Result<FieldValue, String> {
        match self {
            FieldCast::Integer => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|e| e.to_string()),
            FieldCast::Float => raw
                .trim()
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|e| e.to_string()),
            FieldCast::Text => Ok(FieldValue::Text(raw.to_string())),
        }
    }
}

/// Per-column cast directives, keyed by header name.
pub type CastDirectives = HashMap<String, FieldCast>;

/// Field name to value mapping for one data row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, name: &str) -> Result<&FieldValue> {
        self.fields
            .get(name)
            .ok_or_else(|| BikeshareError::MissingKey(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Removes and returns a field, failing if the row never had it.
    pub fn take(&mut self, name: &str) -> Result<FieldValue> {
        self.fields
            .remove(name)
            .ok_or_else(|| BikeshareError::MissingKey(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> HashMap<String, FieldValue> {
        self.fields
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Builds the `csv` reader shared by every loader: comma separated, no quoting,
/// no implicit header handling and ragged rows allowed so callers can report them.
pub(crate) fn delimited_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b',')
        .quoting(false)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Fields of `row` with whitespace removed from the ends of the line: the first
/// field loses its leading and the last field its trailing whitespace. Interior
/// fields are left untouched.
pub(crate) fn line_fields(row: &StringRecord) -> Vec<&str> {
    let last = row.len().saturating_sub(1);
    row.iter()
        .enumerate()
        .map(|(i, field)| {
            let field = if i == 0 { field.trim_start() } else { field };
            if i == last { field.trim_end() } else { field }
        })
        .collect()
}

pub(crate) fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

/// Opens `path` and parses it with [`parse_records`].
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_records(path: impl AsRef<Path>, casts: &CastDirectives) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| BikeshareError::io(path, e))?;
    let records = parse_records(file, casts)?;
    debug!(rows = records.len(), "Parsed delimited file");
    Ok(records)
}

/// Parses header-led comma-delimited text into records.
///
/// # Errors
///
/// - [`BikeshareError::UnknownCastField`] if a directive names a column the
///   header does not declare. Empty input has an empty header, so any
///   directive fails.
/// - [`BikeshareError::MalformedRow`] if a row's field count differs from the
///   header's.
/// - [`BikeshareError::Format`] if a cast fails.
pub fn parse_records<R: Read>(reader: R, casts: &CastDirectives) -> Result<Vec<Record>> {
    let mut rdr = delimited_reader(reader);
    let mut rows = rdr.records();

    let header = match rows.next() {
        Some(row) => row?,
        None => StringRecord::new(),
    };
    let names: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    if let Some(unknown) = casts.keys().find(|k| !names.iter().any(|n| n == *k)) {
        return Err(BikeshareError::UnknownCastField(unknown.clone()));
    }
    let column_casts: Vec<Option<FieldCast>> =
        names.iter().map(|n| casts.get(n).copied()).collect();

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        let line = line_of(&row);
        let fields = line_fields(&row);
        if fields.len() != names.len() {
            return Err(BikeshareError::MalformedRow {
                line,
                expected: names.len(),
                found: fields.len(),
            });
        }

        let mut record = Record::default();
        for ((name, cast), raw) in names.iter().zip(&column_casts).zip(fields) {
            let value = match cast {
                Some(cast) => cast.apply(raw).map_err(|reason| BikeshareError::Format {
                    field: name.clone(),
                    value: raw.to_string(),
                    line,
                    reason,
                })?,
                None => FieldValue::Text(raw.to_string()),
            };
            // duplicate header names: the later column wins
            record.insert(name.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}
