//! The two scheduled phases.
//!
//! Forecast collection runs before the target day unfolds; comparison runs
//! after it has completed, and assumes the forecast document already exists.
//! Per-region provider failures are isolated; whole-phase failures (missing
//! forecast, storage errors) abort with a non-zero exit.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};

use wxtrack_core::{
    AccuracyResult, Config, DayResult, Metric, ObservationDocument, ObservationKind,
    ObservationRecord,
};
use wxtrack_provider::ObservationClient;
use wxtrack_store::{DocumentStore, StoreError};

/// Fetch one record per catalog region, in catalog order, pausing between
/// requests. A failed region is logged and omitted from the returned set.
async fn collect_regions(
    client: &ObservationClient,
    config: &Config,
    date: NaiveDate,
    kind: ObservationKind,
) -> Vec<ObservationRecord> {
    let delay = Duration::from_millis(config.provider.request_delay_ms);
    let mut records = Vec::with_capacity(config.regions.len());

    for region in &config.regions {
        match client.fetch(region, date, kind).await {
            Ok(record) => {
                tracing::info!(
                    region = %region.name,
                    high = ?record.high_temp,
                    low = ?record.low_temp,
                    rain = ?record.rain,
                    "collected {}",
                    kind.as_str()
                );
                records.push(record);
            }
            Err(e) => {
                tracing::warn!(region = %region.name, error = %e, "skipping region");
            }
        }

        // Politeness to the free provider, not a correctness requirement.
        tokio::time::sleep(delay).await;
    }

    records
}

/// Phase 1: capture the day's forecast before the day happens.
///
/// Succeeds as long as at least one region was collected; a reduced set just
/// means fewer samples downstream.
pub async fn collect_forecast(config: &Config, date: NaiveDate) -> Result<()> {
    tracing::info!(%date, "collecting forecasts");
    let client = ObservationClient::new(&config.provider)?;
    let store = DocumentStore::new(&config.data_dir);

    let records = collect_regions(&client, config, date, ObservationKind::Forecast).await;
    if records.is_empty() {
        bail!("no forecasts collected for {date}: every region fetch failed");
    }
    if records.len() < config.regions.len() {
        tracing::warn!(
            collected = records.len(),
            catalog = config.regions.len(),
            "partial forecast collection"
        );
    }

    let doc = ObservationDocument::new(date, ObservationKind::Forecast, records);
    store.save_observations(&doc)?;
    tracing::info!(regions = doc.region_count, "forecast collection complete");
    Ok(())
}

/// Phase 2: collect the completed day's actual weather, compare against the
/// stored forecast, persist the result, and rebuild the summary feed.
pub async fn compare(config: &Config, date: NaiveDate) -> Result<()> {
    tracing::info!(%date, "processing results");
    let store = DocumentStore::new(&config.data_dir);

    // Fail fast before any network work: without the forecast there is
    // nothing to compare, and this date has only one valid invocation.
    let forecast_doc = match store.load_forecast(date) {
        Ok(doc) => doc,
        Err(StoreError::NotFound { .. }) => {
            bail!("no forecast document for {date}; cannot compare without a forecast")
        }
        Err(e) => return Err(e).context("loading forecast document"),
    };

    let client = ObservationClient::new(&config.provider)?;
    let actuals = collect_regions(&client, config, date, ObservationKind::Actual).await;

    let actual_doc = ObservationDocument::new(date, ObservationKind::Actual, actuals);
    store.save_observations(&actual_doc)?;

    let accuracy = wxtrack_accuracy::compute_accuracy(
        &forecast_doc.regions,
        &actual_doc.regions,
        &config.thresholds,
    );
    log_summary(&accuracy);

    let result = DayResult {
        date,
        processed_at: Utc::now(),
        forecast_collected_at: Some(forecast_doc.collected_at),
        accuracy,
    };
    store.save_day_result(&result)?;

    let feed = store.rebuild_summary()?;
    tracing::info!(total_days = feed.total_days, "compare phase complete");
    Ok(())
}

fn log_summary(accuracy: &AccuracyResult) {
    for metric in Metric::ALL {
        match accuracy.summary.get(metric) {
            Some(s) => tracing::info!(
                "{}: {}% exact | {}% within {}{} | {}% within {}{} | std dev {}{}",
                metric.label(),
                s.exact_pct,
                s.near_pct,
                s.near_threshold,
                s.unit,
                s.wide_pct,
                s.wide_threshold,
                s.unit,
                s.std_dev,
                s.unit
            ),
            None => tracing::info!("{}: no data", metric.label()),
        }
    }

    if !accuracy.unmatched.is_empty() {
        tracing::warn!(
            regions = ?accuracy.unmatched,
            "forecast regions with no actual record"
        );
    }

    tracing::info!(
        "overall score: {}% | average std dev: {}",
        accuracy.overall_score,
        accuracy.avg_std_dev
    );
}
