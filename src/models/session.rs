use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of behaviors the detector watches for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SignalType {
    MultipleFaces,
    LookingAway,
    PhoneUsage,
    NoFace,
    AudioAnomaly,
}

impl SignalType {
    pub const ALL: [SignalType; 5] = [
        SignalType::MultipleFaces,
        SignalType::LookingAway,
        SignalType::PhoneUsage,
        SignalType::NoFace,
        SignalType::AudioAnomaly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::MultipleFaces => "MultipleFaces",
            SignalType::LookingAway => "LookingAway",
            SignalType::PhoneUsage => "PhoneUsage",
            SignalType::NoFace => "NoFace",
            SignalType::AudioAnomaly => "AudioAnomaly",
        }
    }
}

/// Severity controls the alert policy: High interrupts, Medium sometimes
/// interrupts, Low only lands in the rolling feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// Immutable record of one debounced detection event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub timestamp: DateTime<Utc>,
    pub signal: SignalType,
    pub severity: Severity,
    pub message: String,
}

/// Per-signal violation tallies plus the running total.
///
/// Invariant: `total_violations` equals the sum of the per-signal counts.
/// All mutation goes through [`SessionStats::bump`] to keep it that way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_violations: u32,
    pub multiple_face_count: u32,
    pub gaze_away_count: u32,
    pub phone_usage_count: u32,
    pub no_face_count: u32,
    pub audio_anomaly_count: u32,
}

impl SessionStats {
    pub fn bump(&mut self, signal: SignalType) {
        match signal {
            SignalType::MultipleFaces => self.multiple_face_count += 1,
            SignalType::LookingAway => self.gaze_away_count += 1,
            SignalType::PhoneUsage => self.phone_usage_count += 1,
            SignalType::NoFace => self.no_face_count += 1,
            SignalType::AudioAnomaly => self.audio_anomaly_count += 1,
        }
        self.total_violations += 1;
    }

    pub fn count_for(&self, signal: SignalType) -> u32 {
        match signal {
            SignalType::MultipleFaces => self.multiple_face_count,
            SignalType::LookingAway => self.gaze_away_count,
            SignalType::PhoneUsage => self.phone_usage_count,
            SignalType::NoFace => self.no_face_count,
            SignalType::AudioAnomaly => self.audio_anomaly_count,
        }
    }

    pub fn per_signal_sum(&self) -> u32 {
        SignalType::ALL.iter().map(|s| self.count_for(*s)).sum()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MonitorStatus {
    Idle,
    Monitoring,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        MonitorStatus::Idle
    }
}

/// One start-to-stop monitoring run and everything it accumulated.
///
/// After `stop_exam` the violations and stats stay readable for summary and
/// dashboard display; the next `start_exam` clears them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Option<String>,
    pub status: MonitorStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub demo_mode: bool,
    pub violations: Vec<Violation>,
    pub stats: SessionStats,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: None,
            status: MonitorStatus::Idle,
            started_at: None,
            demo_mode: false,
            violations: Vec::new(),
            stats: SessionStats::default(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_monitoring(&self) -> bool {
        self.status == MonitorStatus::Monitoring
    }

    /// Wipes the previous run and enters Monitoring.
    pub fn begin(&mut self, id: String, started_at: DateTime<Utc>, demo_mode: bool) {
        *self = Self {
            id: Some(id),
            status: MonitorStatus::Monitoring,
            started_at: Some(started_at),
            demo_mode,
            violations: Vec::new(),
            stats: SessionStats::default(),
        };
    }

    /// Leaves Monitoring but keeps violations/stats readable.
    pub fn end(&mut self) {
        self.status = MonitorStatus::Idle;
    }

    /// Appends a violation and bumps the matching stats in one step so the
    /// total-equals-sum invariant cannot be broken by a caller.
    pub fn push_violation(&mut self, violation: Violation) {
        self.stats.bump(violation.signal);
        self.violations.push(violation);
    }

    /// Latest `n` violations, most recent first, for the live-alert feed.
    pub fn recent_violations(&self, n: usize) -> Vec<Violation> {
        self.violations.iter().rev().take(n).cloned().collect()
    }

    pub fn suspicious(&self) -> bool {
        self.stats.total_violations > 0
    }
}
