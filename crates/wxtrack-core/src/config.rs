//! Static runtime configuration: region catalog, provider endpoint, metric
//! tolerance thresholds. Loaded once at process start and passed explicitly;
//! never mutated at runtime.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{MetricSet, Region};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Tolerance bands and display unit for one metric.
///
/// `exact` is carried from the configuration format but the accuracy
/// computation uses a fixed 0.5 cutoff for its "exact" bucket instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub exact: f64,
    pub near: f64,
    pub wide: f64,
    pub unit: String,
}

impl MetricThresholds {
    fn new(exact: f64, near: f64, wide: f64, unit: &str) -> Self {
        Self {
            exact,
            near,
            wide,
            unit: unit.to_string(),
        }
    }
}

/// Weather provider endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the Open-Meteo forecast endpoint.
    pub base_url: String,

    /// IANA timezone the provider should align daily/hourly arrays to.
    pub timezone: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between consecutive region requests (politeness to the free API).
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_request_delay_ms() -> u64 {
    500
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timezone: "Australia/Sydney".to_string(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for persisted documents
    /// (`forecasts/`, `actuals/`, `results/`).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Provider endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Region catalog, in collection order
    #[serde(default = "default_regions")]
    pub regions: Vec<Region>,

    /// Per-metric tolerance bands
    #[serde(default = "default_thresholds")]
    pub thresholds: MetricSet<MetricThresholds>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// NSW regions with representative city coordinates.
fn default_regions() -> Vec<Region> {
    vec![
        Region::new("Sydney", -33.87, 151.21),
        Region::new("Newcastle", -32.93, 151.78),
        Region::new("Wollongong", -34.42, 150.89),
        Region::new("Central Coast", -33.43, 151.34),
        Region::new("Blue Mountains", -33.72, 150.31),
        Region::new("Penrith", -33.75, 150.69),
        Region::new("Broken Hill", -31.95, 141.45),
        Region::new("Dubbo", -32.24, 148.60),
        Region::new("Tamworth", -31.09, 150.93),
        Region::new("Coffs Harbour", -30.30, 153.11),
        Region::new("Lismore", -28.81, 153.28),
        Region::new("Wagga Wagga", -35.12, 147.37),
        Region::new("Albury", -36.08, 146.92),
        Region::new("Orange", -33.28, 149.10),
        Region::new("Bathurst", -33.42, 149.58),
        Region::new("Griffith", -34.29, 146.04),
        Region::new("Armidale", -30.51, 151.67),
        Region::new("Port Macquarie", -31.43, 152.91),
        Region::new("Nowra", -34.88, 150.60),
        Region::new("Moree", -29.46, 149.85),
    ]
}

fn default_thresholds() -> MetricSet<MetricThresholds> {
    MetricSet {
        high_temp: MetricThresholds::new(0.0, 2.0, 4.0, "°C"),
        low_temp: MetricThresholds::new(0.0, 2.0, 4.0, "°C"),
        wind_speed: MetricThresholds::new(0.0, 1.0, 10.0, "km/h"),
        humidity: MetricThresholds::new(0.0, 5.0, 10.0, "%"),
        rain: MetricThresholds::new(0.0, 1.0, 5.0, "mm"),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            provider: ProviderConfig::default(),
            regions: default_regions(),
            thresholds: default_thresholds(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path, that file must exist and parse. Otherwise looks
    /// for `wxtrack.toml` in the working directory, then the user config
    /// directory, and falls back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let local = PathBuf::from("wxtrack.toml");
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(dir) = dirs::config_dir() {
            let user = dir.join("wxtrack").join("config.toml");
            if user.exists() {
                return Self::from_file(&user);
            }
        }

        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration and validate it.
    ///
    /// Returns an error if validation fails; warnings are logged.
    pub fn load_validated(path: Option<&Path>) -> Result<Self> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.regions.is_empty() {
            result.add_error("regions", "region catalog is empty");
        }

        let mut seen = std::collections::HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.name.as_str()) {
                result.add_error("regions", format!("duplicate region name '{}'", region.name));
            }
            if !(-90.0..=90.0).contains(&region.lat) {
                result.add_error(
                    "regions",
                    format!("{}: latitude {} out of range", region.name, region.lat),
                );
            }
            if !(-180.0..=180.0).contains(&region.lon) {
                result.add_error(
                    "regions",
                    format!("{}: longitude {} out of range", region.name, region.lon),
                );
            }
        }

        for (metric, thresholds) in self.thresholds.iter() {
            if thresholds.near > thresholds.wide {
                result.add_error(
                    format!("thresholds.{metric}"),
                    format!(
                        "near threshold {} exceeds wide threshold {}",
                        thresholds.near, thresholds.wide
                    ),
                );
            }
        }

        if self.provider.base_url.is_empty() {
            result.add_error("provider.base_url", "provider base URL is empty");
        }

        if self.provider.request_delay_ms == 0 {
            result.add_warning(
                "provider.request_delay_ms",
                "no pause between provider requests",
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::io::Write;

    #[test]
    fn default_catalog_has_twenty_unique_regions() {
        let config = Config::default();
        assert_eq!(config.regions.len(), 20);
        let names: std::collections::HashSet<_> =
            config.regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 20);
        assert!(config.validate().is_valid());
    }

    #[test]
    fn default_thresholds_match_metric_units() {
        let config = Config::default();
        assert_eq!(config.thresholds.high_temp.near, 2.0);
        assert_eq!(config.thresholds.high_temp.wide, 4.0);
        assert_eq!(config.thresholds.wind_speed.wide, 10.0);
        assert_eq!(config.thresholds.rain.unit, "mm");
    }

    #[test]
    fn duplicate_region_name_fails_validation() {
        let mut config = Config::default();
        config.regions.push(Region::new("Sydney", -33.87, 151.21));
        let validation = config.validate();
        assert!(!validation.is_valid());
        assert!(validation.error_summary().contains("duplicate"));
    }

    #[test]
    fn inverted_thresholds_fail_validation() {
        let mut config = Config::default();
        config.thresholds.rain.near = 6.0; // wide is 5.0
        let validation = config.validate();
        assert!(!validation.is_valid());
        assert!(validation.error_summary().contains("thresholds.rain"));
    }

    #[test]
    fn out_of_range_coordinates_fail_validation() {
        let mut config = Config::default();
        config.regions[0].lat = 123.0;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn zero_delay_is_a_warning_not_an_error() {
        let mut config = Config::default();
        config.provider.request_delay_ms = 0;
        let validation = config.validate();
        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn load_from_toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wxtrack.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "data_dir = \"/tmp/wx\"\n\n[provider]\nbase_url = \"http://localhost:9999\"\ntimezone = \"Australia/Sydney\"\n"
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/wx"));
        assert_eq!(config.provider.base_url, "http://localhost:9999");
        // Unspecified sections keep defaults
        assert_eq!(config.regions.len(), 20);
        assert_eq!(config.provider.timeout_secs, 30);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/wxtrack.toml")));
        assert!(result.is_err());
    }
}
