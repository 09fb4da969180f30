//! CLI entry point for the bike-share trip analysis.
//!
//! Reads the trips and stations files, enriches every trip with distance and
//! speed, prints the arrival report and writes the plots. With no arguments it
//! reads `trips.csv` and `stations.csv` from the working directory.

use anyhow::{Context, Result};
use bikeshare_trips::config::AnalysisConfig;
use bikeshare_trips::pipeline;
use clap::Parser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_trips")]
#[command(about = "Distance, speed and arrival summaries for bike-share trips", long_about = None)]
struct Cli {
    /// JSON file with analysis settings; flags below override it
    #[arg(short, long)]
    config: Option<String>,

    /// Trips file (header row, comma separated)
    #[arg(long)]
    trips: Option<PathBuf>,

    /// Stations file (name,latitude,longitude)
    #[arg(long)]
    stations: Option<PathBuf>,

    /// Directory for plots and the JSON report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Station whose arrivals are counted by weekday
    #[arg(long)]
    end_station: Option<String>,

    /// Bike whose rides are plotted
    #[arg(long)]
    bike_id: Option<String>,

    /// Number of histogram bins
    #[arg(long)]
    bins: Option<usize>,
}

impl Cli {
    fn resolve_config(self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)
                .with_context(|| format!("loading config from {path}"))?,
            None => AnalysisConfig::default(),
        };

        if let Some(trips) = self.trips {
            config.trips_path = trips;
        }
        if let Some(stations) = self.stations {
            config.stations_path = stations;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(end_station) = self.end_station {
            config.target_end_station = end_station;
        }
        if let Some(bike_id) = self.bike_id {
            config.bike_id = bike_id;
        }
        if let Some(bins) = self.bins {
            config.histogram_bins = bins;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_trips.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_trips.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = Cli::parse().resolve_config()?;
    info!(
        trips = %config.trips_path.display(),
        stations = %config.stations_path.display(),
        output_dir = %config.output_dir.display(),
        "Starting analysis"
    );

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let summary = pipeline::run(&config, &mut std::io::stdout().lock())?;

    info!(
        trips = summary.trips,
        enriched = summary.enrichment.enriched,
        bike_rides = summary.bike_rides,
        "Analysis finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_uses_defaults() {
        let cli = Cli::try_parse_from(["bikeshare_trips"]).unwrap();
        assert_eq!(cli.resolve_config().unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "bikeshare_trips",
            "--trips",
            "data/t.csv",
            "--bike-id",
            "4417",
            "--bins",
            "20",
            "-o",
            "out",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.trips_path, PathBuf::from("data/t.csv"));
        assert_eq!(config.bike_id, "4417");
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.stations_path, PathBuf::from("stations.csv"));
    }

    #[test]
    fn test_zero_bins_is_rejected() {
        let cli = Cli::try_parse_from(["bikeshare_trips", "--bins", "0"]).unwrap();
        assert!(cli.resolve_config().is_err());
    }
}
