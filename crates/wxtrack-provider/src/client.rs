use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use wxtrack_core::{round1, ObservationKind, ObservationRecord, ProviderConfig, Region};

use crate::error::ProviderError;

/// Lookback window requested in actual mode. The provider backfills recent
/// days with station-assimilated values, so asking with a trailing window
/// surfaces near-observed data instead of raw model output.
const ACTUAL_PAST_DAYS: u32 = 2;

const DAILY_VARIABLES: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,wind_speed_10m_max";
const HOURLY_VARIABLES: &str = "relative_humidity_2m";

/// Client for the Open-Meteo forecast endpoint.
#[derive(Debug, Clone)]
pub struct ObservationClient {
    client: Client,
    base_url: String,
    timezone: String,
}

impl ObservationClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    /// Fetch one region's observation record for `date`.
    ///
    /// Forecast mode requests exactly the target day and reads index 0 of
    /// each daily array. Actual mode adds a trailing window and locates the
    /// target date's index in the returned date array explicitly; the hourly
    /// humidity series is filtered to the target date before averaging since
    /// it may span the extra days.
    pub async fn fetch(
        &self,
        region: &Region,
        date: NaiveDate,
        kind: ObservationKind,
    ) -> Result<ObservationRecord, ProviderError> {
        let date_str = date.format("%Y-%m-%d").to_string();

        let mut query: Vec<(&str, String)> = vec![
            ("latitude", region.lat.to_string()),
            ("longitude", region.lon.to_string()),
            ("daily", DAILY_VARIABLES.to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("timezone", self.timezone.clone()),
            ("start_date", date_str.clone()),
            ("end_date", date_str.clone()),
            ("wind_speed_unit", "kmh".to_string()),
            ("precipitation_unit", "mm".to_string()),
            ("temperature_unit", "celsius".to_string()),
        ];
        if kind == ObservationKind::Actual {
            query.push(("past_days", ACTUAL_PAST_DAYS.to_string()));
        }

        tracing::debug!(region = %region.name, date = %date_str, kind = kind.as_str(), "fetching observation");

        let response = self.client.get(&self.base_url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body: OpenMeteoResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let daily = body.daily.unwrap_or_default();
        let hourly = body.hourly.unwrap_or_default();

        let idx = match kind {
            ObservationKind::Forecast => 0,
            ObservationKind::Actual => daily
                .time
                .iter()
                .position(|d| d == &date_str)
                .ok_or_else(|| ProviderError::DateNotFound {
                    date: date_str.clone(),
                    available: daily.time.clone(),
                })?,
        };

        // Forecast responses hold exactly one day of hourly data, so every
        // value belongs to the target date. Actual responses need the
        // date-prefix filter.
        let humidity = match kind {
            ObservationKind::Forecast => average_humidity(&hourly, None),
            ObservationKind::Actual => average_humidity(&hourly, Some(&date_str)),
        };

        Ok(ObservationRecord {
            region: region.name.clone(),
            lat: region.lat,
            lon: region.lon,
            date,
            high_temp: daily_value(&daily.temperature_2m_max, idx),
            low_temp: daily_value(&daily.temperature_2m_min, idx),
            wind_speed: daily_value(&daily.wind_speed_10m_max, idx),
            humidity,
            rain: daily_value(&daily.precipitation_sum, idx),
        })
    }
}

/// Index into a daily value array, treating out-of-range and null entries as
/// "no value".
fn daily_value(values: &[Option<f64>], idx: usize) -> Option<f64> {
    values.get(idx).copied().flatten()
}

/// Mean of the non-null hourly humidity values, rounded to 1 decimal.
///
/// With a date prefix, only timestamps on that date count. `None` when no
/// values survive the filter.
fn average_humidity(hourly: &HourlyBlock, date_prefix: Option<&str>) -> Option<f64> {
    let values: Vec<f64> = hourly
        .relative_humidity_2m
        .iter()
        .enumerate()
        .filter_map(|(i, value)| match date_prefix {
            Some(prefix) => {
                let time = hourly.time.get(i)?;
                if time.starts_with(prefix) {
                    *value
                } else {
                    None
                }
            }
            None => *value,
        })
        .collect();

    if values.is_empty() {
        return None;
    }
    Some(round1(values.iter().sum::<f64>() / values.len() as f64))
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: Option<DailyBlock>,
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
}
