use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{
    config::DetectionConfig,
    detection::{RecordOutcome, SignalSampler, ViolationRecorder},
    store::DashboardStore,
};

use super::controller::{record_from, snapshot_of, MonitorState};
use super::events::{EventBus, ProctorEvent};

/// Recurring detection tick, raced against the controller's cancellation
/// token so `stop_exam` has a single authoritative cancellation point.
pub(crate) async fn detection_loop(
    state: Arc<Mutex<MonitorState>>,
    sampler: Arc<dyn SignalSampler>,
    recorder: ViolationRecorder,
    config: DetectionConfig,
    events: EventBus,
    store: Arc<DashboardStore>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut guard = state.lock().await;
                if !guard.session.is_monitoring() {
                    break;
                }

                let outcomes = run_detection_pass(&mut guard, sampler.as_ref(), &recorder);
                if !outcomes.is_empty() {
                    // Mirror of the original's save-on-violation: the dashboard
                    // record is rewritten whenever the feed grows.
                    if let Err(err) = store.save(record_from(&guard, true)) {
                        error!("failed to persist dashboard record: {err:#}");
                    }
                }
                let snapshot = snapshot_of(&guard, &config);
                drop(guard);

                for outcome in outcomes {
                    events.emit(ProctorEvent::ViolationRecorded(outcome.violation.clone()));
                    if outcome.alert {
                        events.emit(ProctorEvent::AlertRaised {
                            message: outcome.violation.message,
                            severity: outcome.violation.severity,
                            timestamp: outcome.violation.timestamp,
                        });
                    }
                }
                events.emit(ProctorEvent::DashboardUpdated(snapshot));
            }
            _ = cancel.cancelled() => {
                info!("detection loop shutting down");
                break;
            }
        }
    }
}

/// One synchronous detection pass: an independent sample per signal, fed to
/// that signal's counter; whatever fires is recorded against the session.
pub(crate) fn run_detection_pass(
    state: &mut MonitorState,
    sampler: &dyn SignalSampler,
    recorder: &ViolationRecorder,
) -> Vec<RecordOutcome> {
    let elapsed_minutes = state.clock.elapsed_minutes();
    let now = Utc::now();
    let MonitorState {
        session, counters, ..
    } = state;

    let mut outcomes = Vec::new();
    for counter in counters.iter_mut() {
        let sample = sampler.sample();
        if counter.tick(sample, elapsed_minutes) {
            let profile = counter.profile();
            let (signal, severity, message) =
                (profile.signal, profile.severity, profile.message);
            outcomes.push(recorder.record(session, signal, severity, message, now, sampler));
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::SequenceSampler;
    use crate::models::{Severity, SignalType};

    fn fresh_state(config: &DetectionConfig) -> MonitorState {
        let mut state = MonitorState::new(config);
        state.begin("test-session".into(), true);
        state
    }

    #[test]
    fn counters_fire_only_after_their_thresholds() {
        let config = DetectionConfig::default();
        let mut state = fresh_state(&config);
        let recorder = ViolationRecorder::new(config.medium_alert_probability);
        // Every sample qualifies, including the medium-alert rolls.
        let sampler = SequenceSampler::constant(0.0);

        let first = run_detection_pass(&mut state, &sampler, &recorder);
        assert!(first.is_empty());

        // Second pass: every threshold-2 counter fires; NoFace (threshold 3)
        // still holds back.
        let second = run_detection_pass(&mut state, &sampler, &recorder);
        assert_eq!(second.len(), 4);
        assert!(second
            .iter()
            .all(|o| o.violation.signal != SignalType::NoFace));

        // Third pass: only NoFace reaches its threshold; the others were
        // reset by firing and sit at one hit again.
        let third = run_detection_pass(&mut state, &sampler, &recorder);
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].violation.signal, SignalType::NoFace);
        assert_eq!(third[0].violation.severity, Severity::High);
        assert!(third[0].alert);

        assert_eq!(state.session.stats.total_violations, 5);
        assert_eq!(
            state.session.stats.total_violations,
            state.session.stats.per_signal_sum()
        );
    }

    #[test]
    fn non_qualifying_samples_never_fire() {
        let config = DetectionConfig::default();
        let mut state = fresh_state(&config);
        let recorder = ViolationRecorder::new(config.medium_alert_probability);
        let sampler = SequenceSampler::constant(1.0);

        for _ in 0..20 {
            assert!(run_detection_pass(&mut state, &sampler, &recorder).is_empty());
        }
        assert_eq!(state.session.stats.total_violations, 0);
        assert!(state.session.violations.is_empty());
    }

    #[test]
    fn alert_policy_follows_severity() {
        let config = DetectionConfig::default();
        let mut state = fresh_state(&config);
        let recorder = ViolationRecorder::new(config.medium_alert_probability);
        let sampler = SequenceSampler::constant(0.0);

        run_detection_pass(&mut state, &sampler, &recorder);
        let outcomes = run_detection_pass(&mut state, &sampler, &recorder);

        for outcome in &outcomes {
            match outcome.violation.severity {
                Severity::High => assert!(outcome.alert),
                // Roll of 0.0 is under the 0.5 alert probability.
                Severity::Medium => assert!(outcome.alert),
                Severity::Low => assert!(!outcome.alert),
            }
        }
    }
}
