//! JSON document store for wxtrack.
//!
//! Per-day forecast, actual, and result documents live under
//! `<data_dir>/{forecasts,actuals,results}/<date>.json`, with the aggregate
//! feed at `<data_dir>/results/summary.json`. All writes are whole-file
//! overwrites; the summary feed is fully recomputed from the result files on
//! every rebuild, so it self-heals from a partial or missing prior summary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use wxtrack_core::{DayResult, ObservationDocument, ObservationKind, SummaryEntry, SummaryFeed};

/// File name of the aggregate feed inside the results directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Storage errors. None of these are recovered locally; a failed read or
/// write aborts the invocation rather than leaving a partial canonical
/// document behind.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No {kind} document for {date} at {}", .path.display())]
    NotFound {
        kind: &'static str,
        date: NaiveDate,
        path: PathBuf,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid document {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    data_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn observation_path(&self, kind: ObservationKind, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(kind.dir_name())
            .join(format!("{date}.json"))
    }

    pub fn result_path(&self, date: NaiveDate) -> PathBuf {
        self.results_dir().join(format!("{date}.json"))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.results_dir().join(SUMMARY_FILE)
    }

    fn results_dir(&self) -> PathBuf {
        self.data_dir.join("results")
    }

    /// Persist a per-day observation document. Re-running for the same date
    /// replaces the prior file.
    pub fn save_observations(&self, doc: &ObservationDocument) -> Result<PathBuf, StoreError> {
        let path = self.observation_path(doc.kind, doc.date);
        self.write_json(&path, doc)?;
        tracing::info!(
            path = %path.display(),
            regions = doc.region_count,
            "saved {} document",
            doc.kind.as_str()
        );
        Ok(path)
    }

    /// Load a per-day observation document; `StoreError::NotFound` when the
    /// file does not exist.
    pub fn load_observations(
        &self,
        kind: ObservationKind,
        date: NaiveDate,
    ) -> Result<ObservationDocument, StoreError> {
        let path = self.observation_path(kind, date);
        if !path.exists() {
            return Err(StoreError::NotFound {
                kind: kind.as_str(),
                date,
                path,
            });
        }
        self.read_json(&path)
    }

    /// Load the forecast document the compare phase depends on.
    pub fn load_forecast(&self, date: NaiveDate) -> Result<ObservationDocument, StoreError> {
        self.load_observations(ObservationKind::Forecast, date)
    }

    /// Persist a day's accuracy result, overwriting any prior run's output
    /// for that date.
    pub fn save_day_result(&self, result: &DayResult) -> Result<PathBuf, StoreError> {
        let path = self.result_path(result.date);
        self.write_json(&path, result)?;
        tracing::info!(path = %path.display(), "saved day result");
        Ok(path)
    }

    /// Rebuild the summary feed from every persisted day result.
    ///
    /// Full recomputation: enumerates all `*.json` result files except the
    /// feed itself, projects each to its feed entry, sorts date-descending,
    /// stamps `last_updated`, and overwrites the feed document.
    pub fn rebuild_summary(&self) -> Result<SummaryFeed, StoreError> {
        let results_dir = self.results_dir();
        let mut entries: Vec<SummaryEntry> = Vec::new();

        if results_dir.exists() {
            let dir = fs::read_dir(&results_dir).map_err(|source| StoreError::Read {
                path: results_dir.clone(),
                source,
            })?;

            for entry in dir {
                let entry = entry.map_err(|source| StoreError::Read {
                    path: results_dir.clone(),
                    source,
                })?;
                let path = entry.path();
                if !is_result_file(&path) {
                    continue;
                }
                let result: DayResult = self.read_json(&path)?;
                entries.push(SummaryEntry::from(&result));
            }
        }

        // Most recent first.
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        let feed = SummaryFeed {
            last_updated: Utc::now(),
            total_days: entries.len(),
            results: entries,
        };

        self.write_json(&self.summary_path(), &feed)?;
        tracing::info!(total_days = feed.total_days, "rebuilt summary feed");
        Ok(feed)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<T, StoreError> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Serialize before opening the file so a serialization failure never
        // truncates an existing document.
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, json).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A day-result file: `*.json`, but not the feed itself.
fn is_result_file(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return false;
    }
    path.file_name().and_then(|n| n.to_str()) != Some(SUMMARY_FILE)
}
