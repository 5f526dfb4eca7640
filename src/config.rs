use std::time::Duration;

use crate::models::{Severity, SignalType};

/// Detection parameters for one signal type.
#[derive(Debug, Clone)]
pub struct SignalProfile {
    pub signal: SignalType,
    /// Chance of a positive sample at session start.
    pub base_probability: f64,
    /// Added on top of `base_probability`, scaled by elapsed time up to the
    /// escalation cap. Models attention drifting as the session drags on.
    pub time_coefficient: f64,
    /// Consecutive (or net-positive, under decay) hits required before the
    /// counter fires.
    pub threshold: u32,
    /// A miss decrements the counter by one instead of resetting it to zero.
    pub decay: bool,
    pub severity: Severity,
    pub message: &'static str,
}

/// Tunable knobs for the whole detection pipeline with sensible defaults.
///
/// The numeric constants are one self-consistent set, not a compatibility
/// contract; callers are free to swap in their own profiles.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Period of the recurring detection tick.
    pub tick_interval: Duration,
    /// Elapsed time at which probability escalation stops growing.
    pub escalation_cap_minutes: f64,
    /// Chance that a Medium-severity violation raises an interruptive alert.
    pub medium_alert_probability: f64,
    /// Risk tier is Medium once total violations exceed this.
    pub medium_risk_after: u32,
    /// Risk tier is High once total violations exceed this.
    pub high_risk_after: u32,
    /// Attention score loses this many points per violation, floored at 0.
    pub attention_penalty: u32,
    pub profiles: Vec<SignalProfile>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2000),
            escalation_cap_minutes: 30.0,
            medium_alert_probability: 0.5,
            medium_risk_after: 3,
            high_risk_after: 8,
            attention_penalty: 8,
            profiles: default_profiles(),
        }
    }
}

impl DetectionConfig {
    pub fn profile_for(&self, signal: SignalType) -> Option<&SignalProfile> {
        self.profiles.iter().find(|p| p.signal == signal)
    }
}

pub fn default_profiles() -> Vec<SignalProfile> {
    vec![
        SignalProfile {
            signal: SignalType::MultipleFaces,
            base_probability: 0.03,
            time_coefficient: 0.04,
            threshold: 2,
            decay: false,
            severity: Severity::Medium,
            message: "Multiple faces detected in frame",
        },
        SignalProfile {
            signal: SignalType::LookingAway,
            base_probability: 0.06,
            time_coefficient: 0.05,
            threshold: 2,
            decay: true,
            severity: Severity::Low,
            message: "Student looking away from screen",
        },
        SignalProfile {
            signal: SignalType::PhoneUsage,
            base_probability: 0.02,
            time_coefficient: 0.03,
            threshold: 2,
            decay: false,
            severity: Severity::High,
            message: "Potential phone usage detected",
        },
        SignalProfile {
            signal: SignalType::NoFace,
            base_probability: 0.04,
            time_coefficient: 0.0,
            threshold: 3,
            decay: false,
            severity: Severity::High,
            message: "No face visible in frame",
        },
        SignalProfile {
            signal: SignalType::AudioAnomaly,
            base_probability: 0.06,
            time_coefficient: 0.0,
            threshold: 2,
            decay: true,
            severity: Severity::Medium,
            message: "Unexpected audio activity detected",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_covers_every_signal() {
        let config = DetectionConfig::default();
        for signal in SignalType::ALL {
            let profile = config
                .profile_for(signal)
                .unwrap_or_else(|| panic!("missing profile for {}", signal.as_str()));
            assert!(profile.threshold >= 1);
            assert!(profile.base_probability > 0.0 && profile.base_probability < 1.0);
        }
        assert_eq!(config.profiles.len(), SignalType::ALL.len());
    }
}
