//! Dashboard persistence: one flat JSON document at a fixed path, the
//! localStorage record of the original widget.

use std::{fs, path::PathBuf, sync::RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::{SessionStats, Violation};

/// File name of the persisted dashboard record.
pub const STORE_FILE_NAME: &str = "exam_proctoring.json";

/// Everything the dashboard needs to render after a reload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardRecord {
    pub violations: Vec<Violation>,
    pub stats: SessionStats,
    pub exam_start_time: Option<DateTime<Utc>>,
    /// True while a session is monitoring. A record loaded with this flag set
    /// is stale (the process died mid-session) and is forced back to idle.
    pub active: bool,
}

pub struct DashboardStore {
    path: PathBuf,
    data: RwLock<DashboardRecord>,
}

impl DashboardStore {
    /// Loads the record at `path`, falling back to empty defaults when the
    /// file is missing or malformed. Sessions cannot be resumed across a
    /// reload, so a stale `active` flag is cleared on the spot.
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read dashboard record {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "malformed dashboard record in {}: {err}; starting from defaults",
                    path.display()
                );
                DashboardRecord::default()
            })
        } else {
            DashboardRecord::default()
        };

        if data.active {
            warn!(
                "dashboard record {} was saved mid-session; forcing idle",
                path.display()
            );
            data.active = false;
        }

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn record(&self) -> DashboardRecord {
        self.data.read().unwrap().clone()
    }

    pub fn save(&self, record: DashboardRecord) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        *guard = record;
        self.persist(&guard)
    }

    fn persist(&self, data: &DashboardRecord) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write dashboard record {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, SignalType};

    fn sample_record(active: bool) -> DashboardRecord {
        let mut stats = SessionStats::default();
        stats.bump(SignalType::PhoneUsage);
        stats.bump(SignalType::LookingAway);
        DashboardRecord {
            violations: vec![
                Violation {
                    timestamp: Utc::now(),
                    signal: SignalType::PhoneUsage,
                    severity: Severity::High,
                    message: "Potential phone usage detected".into(),
                },
                Violation {
                    timestamp: Utc::now(),
                    signal: SignalType::LookingAway,
                    severity: Severity::Low,
                    message: "Student looking away from screen".into(),
                },
            ],
            stats,
            exam_start_time: Some(Utc::now()),
            active,
        }
    }

    #[test]
    fn round_trips_an_idle_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let record = sample_record(false);

        {
            let store = DashboardStore::new(path.clone()).unwrap();
            store.save(record.clone()).unwrap();
        }

        let restored = DashboardStore::new(path).unwrap();
        assert_eq!(restored.record(), record);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = DashboardStore::new(dir.path().join(STORE_FILE_NAME)).unwrap();
        assert_eq!(store.record(), DashboardRecord::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let store = DashboardStore::new(path).unwrap();
        assert_eq!(store.record(), DashboardRecord::default());
    }

    #[test]
    fn stale_active_flag_is_forced_idle_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);

        {
            let store = DashboardStore::new(path.clone()).unwrap();
            store.save(sample_record(true)).unwrap();
        }

        let restored = DashboardStore::new(path).unwrap();
        let record = restored.record();
        assert!(!record.active);
        // The rest of the record survives untouched.
        assert_eq!(record.stats.total_violations, 2);
        assert_eq!(record.violations.len(), 2);
    }
}
