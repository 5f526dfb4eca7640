//! Simulated exam-proctoring monitor core.
//!
//! Detection is intentionally fake: pseudo-random samples run through
//! per-signal debounce counters, with probabilities that escalate as the
//! session drags on. A firing counter becomes a timestamped violation, which
//! feeds the rolling alert feed, the risk tier and attention score, and a
//! JSON-backed dashboard record.
//!
//! The UI shell (windows, modals, toasts) is a collaborator, not part of this
//! crate: it subscribes to [`ProctorEvent`]s and polls [`DashboardSnapshot`]s
//! through a [`ProctorController`].

pub mod config;
pub mod detection;
pub mod media;
pub mod models;
pub mod monitor;
pub mod store;

pub use config::{default_profiles, DetectionConfig, SignalProfile};
pub use detection::{
    attention_score, risk_tier, DebounceCounter, RecordOutcome, RiskTier, SequenceSampler,
    SignalSampler, ThreadRngSampler, ViolationRecorder,
};
pub use media::{MediaConstraints, MediaError, MediaGateway, MediaStream, SimulatedGateway};
pub use models::{MonitorStatus, Session, SessionStats, Severity, SignalType, Violation};
pub use monitor::{
    DashboardSnapshot, EventBus, ProctorController, ProctorEvent, SessionClock, SessionSummary,
};
pub use store::{DashboardRecord, DashboardStore, STORE_FILE_NAME};
