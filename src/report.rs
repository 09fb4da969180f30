//! Day-of-week arrival report, printed as text and saved as JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::error::{BikeshareError, Result};

/// Arrivals at one station keyed by start weekday, in first-encounter order.
#[derive(Debug, Serialize)]
pub struct ArrivalReport {
    pub generated_at: DateTime<Utc>,
    pub station: String,
    pub counts: IndexMap<String, usize>,
}

impl ArrivalReport {
    pub fn new(station: impl Into<String>, counts: IndexMap<String, usize>) -> Self {
        Self {
            generated_at: Utc::now(),
            station: station.into(),
            counts,
        }
    }

    /// The label line followed by the counts as a JSON object.
    pub fn render_text(&self) -> Result<String> {
        let counts = serde_json::to_string(&self.counts)?;
        Ok(format!(
            "Number of trips ending at {}:\n{}",
            self.station, counts
        ))
    }

    /// Writes the full report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Writing arrival report");
        let file = File::create(path).map_err(|e| BikeshareError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| BikeshareError::io(path, e))?;
        Ok(())
    }
}
