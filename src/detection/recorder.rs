use chrono::{DateTime, Utc};
use log::info;

use crate::detection::sampler::SignalSampler;
use crate::models::{Session, Severity, SignalType, Violation};

/// What `record` produced: the appended violation and whether it should
/// interrupt the user with a modal alert.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub violation: Violation,
    pub alert: bool,
}

/// Appends violations to the active session and applies the alert policy.
///
/// High severity always interrupts; Medium interrupts with a configured
/// probability to avoid alert fatigue; Low only feeds the rolling log.
#[derive(Debug, Clone)]
pub struct ViolationRecorder {
    medium_alert_probability: f64,
}

impl ViolationRecorder {
    pub fn new(medium_alert_probability: f64) -> Self {
        Self {
            medium_alert_probability,
        }
    }

    pub fn record(
        &self,
        session: &mut Session,
        signal: SignalType,
        severity: Severity,
        message: &str,
        now: DateTime<Utc>,
        sampler: &dyn SignalSampler,
    ) -> RecordOutcome {
        let violation = Violation {
            timestamp: now,
            signal,
            severity,
            message: message.to_string(),
        };
        session.push_violation(violation.clone());

        let alert = match severity {
            Severity::High => true,
            Severity::Medium => sampler.sample() < self.medium_alert_probability,
            Severity::Low => false,
        };

        info!(
            "violation: {} ({}), total={}",
            message,
            severity.as_str(),
            session.stats.total_violations
        );

        RecordOutcome { violation, alert }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::sampler::SequenceSampler;

    fn recorder() -> ViolationRecorder {
        ViolationRecorder::new(0.5)
    }

    fn session() -> Session {
        let mut s = Session::new();
        s.begin("s1".into(), Utc::now(), true);
        s
    }

    #[test]
    fn high_severity_always_alerts() {
        let mut session = session();
        // Sampler would veto if it were consulted.
        let sampler = SequenceSampler::constant(0.99);
        let outcome = recorder().record(
            &mut session,
            SignalType::PhoneUsage,
            Severity::High,
            "Potential phone usage detected",
            Utc::now(),
            &sampler,
        );
        assert!(outcome.alert);
        assert_eq!(session.stats.phone_usage_count, 1);
    }

    #[test]
    fn low_severity_never_alerts() {
        let mut session = session();
        let sampler = SequenceSampler::constant(0.0);
        let outcome = recorder().record(
            &mut session,
            SignalType::LookingAway,
            Severity::Low,
            "Student looking away from screen",
            Utc::now(),
            &sampler,
        );
        assert!(!outcome.alert);
    }

    #[test]
    fn medium_severity_alerts_by_jittered_roll() {
        let mut session = session();

        let below = SequenceSampler::constant(0.4);
        let outcome = recorder().record(
            &mut session,
            SignalType::MultipleFaces,
            Severity::Medium,
            "Multiple faces detected in frame",
            Utc::now(),
            &below,
        );
        assert!(outcome.alert);

        let above = SequenceSampler::constant(0.9);
        let outcome = recorder().record(
            &mut session,
            SignalType::MultipleFaces,
            Severity::Medium,
            "Multiple faces detected in frame",
            Utc::now(),
            &above,
        );
        assert!(!outcome.alert);
    }

    #[test]
    fn record_keeps_stats_invariant() {
        let mut session = session();
        let sampler = SequenceSampler::constant(1.0);
        for signal in SignalType::ALL {
            recorder().record(
                &mut session,
                signal,
                Severity::Low,
                "event",
                Utc::now(),
                &sampler,
            );
        }
        assert_eq!(session.stats.total_violations, 5);
        assert_eq!(session.stats.total_violations, session.stats.per_signal_sum());
        assert_eq!(session.violations.len(), 5);
    }
}
