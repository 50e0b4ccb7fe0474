use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A tracked location. Identity is `name`; coordinates never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Region {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// The five daily metrics whose forecast accuracy is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    HighTemp,
    LowTemp,
    WindSpeed,
    Humidity,
    Rain,
}

impl Metric {
    /// All metrics, in the order they appear in persisted documents.
    pub const ALL: [Metric; 5] = [
        Metric::HighTemp,
        Metric::LowTemp,
        Metric::WindSpeed,
        Metric::Humidity,
        Metric::Rain,
    ];

    /// JSON key for this metric.
    pub fn key(self) -> &'static str {
        match self {
            Metric::HighTemp => "high_temp",
            Metric::LowTemp => "low_temp",
            Metric::WindSpeed => "wind_speed",
            Metric::Humidity => "humidity",
            Metric::Rain => "rain",
        }
    }

    /// Human-readable label for operator output.
    pub fn label(self) -> &'static str {
        match self {
            Metric::HighTemp => "High Temp",
            Metric::LowTemp => "Low Temp",
            Metric::WindSpeed => "Wind Speed",
            Metric::Humidity => "Humidity",
            Metric::Rain => "Rain",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A value per metric, serialized as a JSON object keyed by metric name.
///
/// A fixed-field struct rather than a map so that every metric key is always
/// present and the key order is stable across rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet<T> {
    pub high_temp: T,
    pub low_temp: T,
    pub wind_speed: T,
    pub humidity: T,
    pub rain: T,
}

impl<T> MetricSet<T> {
    /// Build a set by evaluating `f` once per metric, in `Metric::ALL` order.
    pub fn build(mut f: impl FnMut(Metric) -> T) -> Self {
        Self {
            high_temp: f(Metric::HighTemp),
            low_temp: f(Metric::LowTemp),
            wind_speed: f(Metric::WindSpeed),
            humidity: f(Metric::Humidity),
            rain: f(Metric::Rain),
        }
    }

    pub fn get(&self, metric: Metric) -> &T {
        match metric {
            Metric::HighTemp => &self.high_temp,
            Metric::LowTemp => &self.low_temp,
            Metric::WindSpeed => &self.wind_speed,
            Metric::Humidity => &self.humidity,
            Metric::Rain => &self.rain,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut T {
        match metric {
            Metric::HighTemp => &mut self.high_temp,
            Metric::LowTemp => &mut self.low_temp,
            Metric::WindSpeed => &mut self.wind_speed,
            Metric::Humidity => &mut self.humidity,
            Metric::Rain => &mut self.rain,
        }
    }

    /// Iterate `(metric, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &T)> {
        Metric::ALL.iter().map(move |&m| (m, self.get(m)))
    }
}

/// Which side of the comparison a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    Forecast,
    Actual,
}

impl ObservationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObservationKind::Forecast => "forecast",
            ObservationKind::Actual => "actual",
        }
    }

    /// Storage subdirectory for documents of this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            ObservationKind::Forecast => "forecasts",
            ObservationKind::Actual => "actuals",
        }
    }
}

/// One region's weather for one date, either predicted or observed.
///
/// `None` means the provider returned no value for that metric. It propagates
/// through comparison; it is never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub region: String,
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
    pub high_temp: Option<f64>,
    pub low_temp: Option<f64>,
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    pub rain: Option<f64>,
}

impl ObservationRecord {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::HighTemp => self.high_temp,
            Metric::LowTemp => self.low_temp,
            Metric::WindSpeed => self.wind_speed,
            Metric::Humidity => self.humidity,
            Metric::Rain => self.rain,
        }
    }
}

/// Persisted per-day collection of observation records for one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationDocument {
    pub date: NaiveDate,
    pub collected_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ObservationKind,
    pub region_count: usize,
    pub regions: Vec<ObservationRecord>,
}

impl ObservationDocument {
    pub fn new(date: NaiveDate, kind: ObservationKind, regions: Vec<ObservationRecord>) -> Self {
        Self {
            date,
            collected_at: Utc::now(),
            kind,
            region_count: regions.len(),
            regions,
        }
    }
}

/// Forecast vs actual for one metric of one region.
///
/// `diff` is the absolute difference rounded to 2 decimals, or `None` when
/// either side is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub forecast: Option<f64>,
    pub actual: Option<f64>,
    pub diff: Option<f64>,
}

/// All five metric comparisons for one matched region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionComparison {
    pub region: String,
    pub metrics: MetricSet<MetricComparison>,
}

/// Aggregate statistics for one metric across all matched regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub exact_pct: f64,
    pub near_pct: f64,
    pub near_threshold: f64,
    pub wide_pct: f64,
    pub wide_threshold: f64,
    pub mean_diff: f64,
    pub std_dev: f64,
    pub unit: String,
    pub sample_size: usize,
}

/// Output of the accuracy engine for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResult {
    pub summary: MetricSet<Option<MetricSummary>>,
    pub overall_score: f64,
    pub avg_std_dev: f64,
    pub comparisons: Vec<RegionComparison>,
    /// Forecast regions that had no matching actual record. They are excluded
    /// from `comparisons` and from every statistic; listed here so the
    /// exclusion is visible rather than silent.
    #[serde(default)]
    pub unmatched: Vec<String>,
}

/// One calendar date's persisted result document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub processed_at: DateTime<Utc>,
    pub forecast_collected_at: Option<DateTime<Utc>>,
    pub accuracy: AccuracyResult,
}

/// Per-day projection carried in the summary feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub date: NaiveDate,
    pub overall_score: f64,
    pub avg_std_dev: f64,
    pub summary: MetricSet<Option<MetricSummary>>,
}

impl From<&DayResult> for SummaryEntry {
    fn from(result: &DayResult) -> Self {
        Self {
            date: result.date,
            overall_score: result.accuracy.overall_score,
            avg_std_dev: result.accuracy.avg_std_dev,
            summary: result.accuracy.summary.clone(),
        }
    }
}

/// The cross-day aggregate consumed by the front end. Fully rebuilt from the
/// persisted day results on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFeed {
    pub last_updated: DateTime<Utc>,
    pub total_days: usize,
    pub results: Vec<SummaryEntry>,
}

/// Round to 1 decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
