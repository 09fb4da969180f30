use serde::Deserialize;
use std::path::PathBuf;

use crate::distance::{EARTH_RADIUS_MILES, GreatCircle};
use crate::error::{BikeshareError, Result};

/// Inputs, outputs and constants of one analysis run.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
/// ```json
/// {
///   "trips_path": "data/trips.csv",
///   "bike_id": "4417"
/// }
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub trips_path: PathBuf,
    pub stations_path: PathBuf,
    pub output_dir: PathBuf,
    pub earth_radius_miles: f64,
    pub target_end_station: String,
    pub bike_id: String,
    pub histogram_bins: usize,
    pub distance_plot: String,
    pub speed_plot: String,
    pub route_plot: String,
    pub report_file: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trips_path: PathBuf::from("trips.csv"),
            stations_path: PathBuf::from("stations.csv"),
            output_dir: PathBuf::from("."),
            earth_radius_miles: EARTH_RADIUS_MILES,
            target_end_station: "Forsyth St at Huntington Ave".to_string(),
            bike_id: "5800".to_string(),
            histogram_bins: 100,
            distance_plot: "distances.svg".to_string(),
            speed_plot: "speeds.svg".to_string(),
            route_plot: "singlebike.svg".to_string(),
            report_file: "arrivals.json".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BikeshareError::io(path, e))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .map_err(|e| BikeshareError::Config(format!("{path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.earth_radius_miles.is_finite() && self.earth_radius_miles > 0.0) {
            return Err(BikeshareError::Config(format!(
                "earth_radius_miles must be positive, got {}",
                self.earth_radius_miles
            )));
        }
        if self.histogram_bins == 0 {
            return Err(BikeshareError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn great_circle(&self) -> GreatCircle {
        GreatCircle::new(self.earth_radius_miles)
    }

    /// Resolves an artifact file name against `output_dir`.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_defaults_match_fixed_run() {
        let config = AnalysisConfig::default();
        assert_eq!(config.trips_path, PathBuf::from("trips.csv"));
        assert_eq!(config.stations_path, PathBuf::from("stations.csv"));
        assert_eq!(config.great_circle().radius, 3959.0);
        assert_eq!(config.histogram_bins, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"bike_id": "4417", "output_dir": "out"}"#).unwrap();
        assert_eq!(config.bike_id, "4417");
        assert_eq!(config.output_path("speeds.svg"), PathBuf::from("out/speeds.svg"));
        assert_eq!(config.target_end_station, "Forsyth St at Huntington Ave");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = serde_json::from_str::<AnalysisConfig>(r#"{"bike": "1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.earth_radius_miles = 0.0;
        assert!(matches!(config.validate(), Err(BikeshareError::Config(_))));

        let mut config = AnalysisConfig::default();
        config.histogram_bins = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_path("bikeshare_trips_test_config.json");
        fs::write(&path, r#"{"earth_radius_miles": 3958.8, "histogram_bins": 50}"#).unwrap();

        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config.earth_radius_miles, 3958.8);
        assert_eq!(config.histogram_bins, 50);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let path = temp_path("bikeshare_trips_test_bad_config.json");
        fs::write(&path, r#"{"histogram_bins": 0}"#).unwrap();
        assert!(AnalysisConfig::load(&path).is_err());
        fs::remove_file(&path).unwrap();
    }
}
