//! Accuracy engine: compares a day's forecast records against its actual
//! records and aggregates per-metric statistics.
//!
//! Pure computation over two ordered record sequences; no I/O, no clock.

use std::collections::HashMap;

use wxtrack_core::{
    round1, round2, AccuracyResult, Metric, MetricComparison, MetricSet, MetricSummary,
    MetricThresholds, ObservationRecord, RegionComparison,
};

/// Diffs at or under this count toward `exact_pct`. This is a fixed
/// within-rounding cutoff; the configured `exact` threshold field is not
/// consulted.
const EXACT_CUTOFF: f64 = 0.5;

/// Compare forecast records against actual records and summarize.
///
/// Records are joined by region name, exact match, in forecast order.
/// Forecast regions with no matching actual are excluded from `comparisons`
/// and every statistic; their names land in `unmatched`. A metric with a
/// missing value on either side yields `diff: None` for that region and does
/// not contribute a sample.
pub fn compute_accuracy(
    forecasts: &[ObservationRecord],
    actuals: &[ObservationRecord],
    thresholds: &MetricSet<MetricThresholds>,
) -> AccuracyResult {
    let actual_by_name: HashMap<&str, &ObservationRecord> =
        actuals.iter().map(|a| (a.region.as_str(), a)).collect();

    let mut comparisons = Vec::new();
    let mut unmatched = Vec::new();
    let mut diffs: MetricSet<Vec<f64>> = MetricSet::default();

    for forecast in forecasts {
        let Some(actual) = actual_by_name.get(forecast.region.as_str()) else {
            unmatched.push(forecast.region.clone());
            continue;
        };

        let metrics = MetricSet::build(|metric| {
            let forecast_value = forecast.metric(metric);
            let actual_value = actual.metric(metric);

            let diff = match (forecast_value, actual_value) {
                (Some(f), Some(a)) => {
                    let diff = round2((f - a).abs());
                    diffs.get_mut(metric).push(diff);
                    Some(diff)
                }
                _ => None,
            };

            MetricComparison {
                forecast: forecast_value,
                actual: actual_value,
                diff,
            }
        });

        comparisons.push(RegionComparison {
            region: forecast.region.clone(),
            metrics,
        });
    }

    let summary = MetricSet::build(|metric| summarize(diffs.get(metric), thresholds.get(metric)));

    let valid: Vec<&MetricSummary> = Metric::ALL
        .iter()
        .filter_map(|&m| summary.get(m).as_ref())
        .collect();

    let overall_score = if valid.is_empty() {
        0.0
    } else {
        round1(valid.iter().map(|s| s.wide_pct).sum::<f64>() / valid.len() as f64)
    };
    let avg_std_dev = if valid.is_empty() {
        0.0
    } else {
        round2(valid.iter().map(|s| s.std_dev).sum::<f64>() / valid.len() as f64)
    };

    AccuracyResult {
        summary,
        overall_score,
        avg_std_dev,
        comparisons,
        unmatched,
    }
}

/// Aggregate one metric's diff list. `None` when the list is empty, which is
/// distinct from a summary full of zeros.
fn summarize(diffs: &[f64], thresholds: &MetricThresholds) -> Option<MetricSummary> {
    if diffs.is_empty() {
        return None;
    }

    let n = diffs.len();
    let pct = |count: usize| round1(count as f64 / n as f64 * 100.0);

    let exact_count = diffs.iter().filter(|&&d| d <= EXACT_CUTOFF).count();
    let near_count = diffs.iter().filter(|&&d| d <= thresholds.near).count();
    let wide_count = diffs.iter().filter(|&&d| d <= thresholds.wide).count();

    let mean = diffs.iter().sum::<f64>() / n as f64;
    // Population standard deviation; a single sample has no spread.
    let std_dev = if n > 1 {
        (diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
    } else {
        0.0
    };

    Some(MetricSummary {
        exact_pct: pct(exact_count),
        near_pct: pct(near_count),
        near_threshold: thresholds.near,
        wide_pct: pct(wide_count),
        wide_threshold: thresholds.wide,
        mean_diff: round2(mean),
        std_dev: round2(std_dev),
        unit: thresholds.unit.clone(),
        sample_size: n,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDate;

    fn thresholds() -> MetricSet<MetricThresholds> {
        wxtrack_core::Config::default().thresholds
    }

    fn record(region: &str) -> ObservationRecord {
        ObservationRecord {
            region: region.to_string(),
            lat: -33.87,
            lon: 151.21,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            high_temp: None,
            low_temp: None,
            wind_speed: None,
            humidity: None,
            rain: None,
        }
    }

    fn with_high(region: &str, high: f64) -> ObservationRecord {
        ObservationRecord {
            high_temp: Some(high),
            ..record(region)
        }
    }

    #[test]
    fn single_sample_example() {
        // forecast 20.0 vs actual 21.3: diff 1.3 is inside near (2) and
        // wide (4) but outside the 0.5 exact cutoff.
        let result = compute_accuracy(
            &[with_high("Sydney", 20.0)],
            &[with_high("Sydney", 21.3)],
            &thresholds(),
        );

        let comp = &result.comparisons[0].metrics.high_temp;
        assert_eq!(comp.forecast, Some(20.0));
        assert_eq!(comp.actual, Some(21.3));
        assert_eq!(comp.diff, Some(1.3));

        let summary = result.summary.high_temp.as_ref().unwrap();
        assert_eq!(summary.exact_pct, 0.0);
        assert_eq!(summary.near_pct, 100.0);
        assert_eq!(summary.wide_pct, 100.0);
        assert_eq!(summary.mean_diff, 1.3);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.sample_size, 1);
        assert_eq!(summary.near_threshold, 2.0);
        assert_eq!(summary.wide_threshold, 4.0);
        assert_eq!(summary.unit, "°C");
    }

    #[test]
    fn matching_is_by_region_name_only() {
        let result = compute_accuracy(
            &[with_high("A", 20.0), with_high("B", 22.0)],
            &[with_high("B", 21.0), with_high("C", 25.0)],
            &thresholds(),
        );

        assert_eq!(result.comparisons.len(), 1);
        assert_eq!(result.comparisons[0].region, "B");
        assert_eq!(result.unmatched, vec!["A".to_string()]);
    }

    #[test]
    fn null_on_either_side_propagates_and_excludes_sample() {
        let mut forecast = with_high("Sydney", 20.0);
        forecast.rain = Some(1.0);
        let mut actual = record("Sydney");
        actual.rain = None; // forecast present, actual missing
        actual.low_temp = Some(15.0); // actual present, forecast missing

        let result = compute_accuracy(&[forecast], &[actual], &thresholds());
        let metrics = &result.comparisons[0].metrics;

        // Keys still appear, diff is null.
        assert_eq!(metrics.rain.forecast, Some(1.0));
        assert_eq!(metrics.rain.actual, None);
        assert_eq!(metrics.rain.diff, None);
        assert_eq!(metrics.low_temp.diff, None);
        assert_eq!(metrics.high_temp.diff, None); // actual.high_temp is None

        // No metric collected a sample, so every summary is None.
        for metric in Metric::ALL {
            assert!(result.summary.get(metric).is_none(), "{metric}");
        }
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.avg_std_dev, 0.0);
    }

    #[test]
    fn empty_sample_summary_is_none_not_zeroed() {
        let result = compute_accuracy(&[], &[], &thresholds());
        assert!(result.summary.high_temp.is_none());
        assert!(result.comparisons.is_empty());
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn threshold_buckets_are_monotonic() {
        let forecasts: Vec<_> = [0.2_f64, 1.0, 3.0, 8.0]
            .iter()
            .enumerate()
            .map(|(i, _)| with_high(&format!("R{i}"), 20.0))
            .collect();
        let actuals: Vec<_> = [0.2_f64, 1.0, 3.0, 8.0]
            .iter()
            .enumerate()
            .map(|(i, d)| with_high(&format!("R{i}"), 20.0 + d))
            .collect();

        let result = compute_accuracy(&forecasts, &actuals, &thresholds());
        let summary = result.summary.high_temp.as_ref().unwrap();

        // diffs 0.2, 1.0, 3.0, 8.0 against exact 0.5 / near 2 / wide 4
        assert_eq!(summary.exact_pct, 25.0);
        assert_eq!(summary.near_pct, 50.0);
        assert_eq!(summary.wide_pct, 75.0);
        assert!(summary.exact_pct <= summary.near_pct);
        assert!(summary.near_pct <= summary.wide_pct);
        assert_eq!(summary.sample_size, 4);
    }

    #[test]
    fn population_std_dev() {
        // diffs 1.0 and 3.0: mean 2.0, population variance 1.0
        let result = compute_accuracy(
            &[with_high("A", 20.0), with_high("B", 20.0)],
            &[with_high("A", 21.0), with_high("B", 23.0)],
            &thresholds(),
        );
        let summary = result.summary.high_temp.as_ref().unwrap();
        assert_eq!(summary.mean_diff, 2.0);
        assert_eq!(summary.std_dev, 1.0);
    }

    #[test]
    fn diff_is_rounded_to_two_decimals() {
        let result = compute_accuracy(
            &[with_high("A", 20.123)],
            &[with_high("A", 20.0)],
            &thresholds(),
        );
        assert_eq!(
            result.comparisons[0].metrics.high_temp.diff,
            Some(0.12)
        );
    }

    #[test]
    fn overall_score_averages_wide_pct_across_metrics_with_data() {
        // high_temp: diff 1.0 -> wide_pct 100. rain: diff 10.0 -> wide_pct 0.
        let mut forecast = with_high("Sydney", 20.0);
        forecast.rain = Some(0.0);
        let mut actual = with_high("Sydney", 21.0);
        actual.rain = Some(10.0);

        let result = compute_accuracy(&[forecast], &[actual], &thresholds());
        assert_eq!(result.summary.high_temp.as_ref().unwrap().wide_pct, 100.0);
        assert_eq!(result.summary.rain.as_ref().unwrap().wide_pct, 0.0);
        // Metrics with no data (low_temp, wind_speed, humidity) don't dilute.
        assert_eq!(result.overall_score, 50.0);
    }

    #[test]
    fn comparisons_preserve_forecast_order() {
        let names = ["Dubbo", "Albury", "Moree"];
        let forecasts: Vec<_> = names.iter().map(|n| with_high(n, 20.0)).collect();
        let actuals: Vec<_> = names.iter().rev().map(|n| with_high(n, 21.0)).collect();

        let result = compute_accuracy(&forecasts, &actuals, &thresholds());
        let order: Vec<&str> = result.comparisons.iter().map(|c| c.region.as_str()).collect();
        assert_eq!(order, names);
    }

    #[test]
    fn engine_is_deterministic() {
        let forecasts = vec![with_high("A", 20.0), with_high("B", 18.0)];
        let actuals = vec![with_high("A", 21.5), with_high("B", 17.0)];
        let first = compute_accuracy(&forecasts, &actuals, &thresholds());
        let second = compute_accuracy(&forecasts, &actuals, &thresholds());
        assert_eq!(first, second);
    }
}
