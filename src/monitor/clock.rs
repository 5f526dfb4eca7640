use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Tracks elapsed monitoring time from a start instant.
///
/// While running, elapsed time is measured against a monotonic anchor; a
/// stopped clock freezes at the last computed duration instead of advancing.
#[derive(Debug, Clone)]
pub struct SessionClock {
    started_at: Option<DateTime<Utc>>,
    anchor: Option<Instant>,
    frozen: Duration,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            started_at: None,
            anchor: None,
            frozen: Duration::ZERO,
        }
    }
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchors the clock at `now` and zeroes any frozen duration.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.anchor = Some(Instant::now());
        self.frozen = Duration::ZERO;
    }

    /// Freezes the clock at its current elapsed value.
    pub fn stop(&mut self) {
        self.frozen = self.elapsed();
        self.anchor = None;
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        match self.anchor {
            Some(anchor) => anchor.elapsed(),
            None => self.frozen,
        }
    }

    /// Fractional minutes since start, feeding probability escalation.
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed().as_secs_f64() / 60.0
    }

    /// Elapsed time as `m:ss` with zero-padded seconds, e.g. "5:17".
    pub fn format_elapsed(&self) -> String {
        format_duration(self.elapsed())
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
