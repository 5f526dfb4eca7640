use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{MonitorStatus, Severity, Violation};

use super::controller::DashboardSnapshot;

/// Everything the core pushes out to UI collaborators.
#[derive(Debug, Clone, Serialize)]
#[serde(
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    tag = "event",
    content = "payload"
)]
pub enum ProctorEvent {
    /// Session entered or left Monitoring.
    StateChanged {
        status: MonitorStatus,
        demo_mode: bool,
    },
    /// A debounced violation landed in the feed.
    ViolationRecorded(Violation),
    /// High-priority interruption for the violation modal.
    AlertRaised {
        message: String,
        severity: Severity,
        timestamp: DateTime<Utc>,
    },
    /// Fresh dashboard numbers, pushed on every tick while Monitoring.
    DashboardUpdated(DashboardSnapshot),
    /// Transient, auto-dismissing notice (demo fallback, simulation banner).
    Notice { message: String },
    /// Stop summary: final duration and violation total.
    SessionSummary {
        duration: String,
        total_violations: u32,
    },
}

/// Broadcast fan-out to UI subscribers. Sending never blocks the tick;
/// lagging receivers lose the oldest events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ProctorEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProctorEvent> {
        self.tx.subscribe()
    }

    /// Fire-and-forget: an event with no subscribers is simply dropped.
    pub fn emit(&self, event: ProctorEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
