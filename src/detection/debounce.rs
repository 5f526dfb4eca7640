use crate::config::SignalProfile;

/// Run-length counter that turns noisy per-tick samples into debounced
/// violation events.
///
/// A single positive sample never fires on its own; the counter must reach the
/// profile's threshold through consecutive (or, under decay, net-positive)
/// hits. Firing resets the counter, so `count` never exceeds the threshold.
#[derive(Debug, Clone)]
pub struct DebounceCounter {
    profile: SignalProfile,
    escalation_cap_minutes: f64,
    count: u32,
}

impl DebounceCounter {
    pub fn new(profile: SignalProfile, escalation_cap_minutes: f64) -> Self {
        Self {
            profile,
            escalation_cap_minutes,
            count: 0,
        }
    }

    pub fn profile(&self) -> &SignalProfile {
        &self.profile
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Detection probability at the given elapsed time. The time term grows
    /// linearly and stops at the escalation cap.
    pub fn effective_probability(&self, elapsed_minutes: f64) -> f64 {
        let factor = (elapsed_minutes / self.escalation_cap_minutes).min(1.0);
        self.profile.base_probability + self.profile.time_coefficient * factor
    }

    /// Feeds one sample. Returns true when the counter fires, which also
    /// resets it to zero.
    pub fn tick(&mut self, sample: f64, elapsed_minutes: f64) -> bool {
        let p = self.effective_probability(elapsed_minutes);
        if sample < p {
            self.count += 1;
            if self.count >= self.profile.threshold {
                self.count = 0;
                return true;
            }
            false
        } else {
            if self.profile.decay {
                self.count = self.count.saturating_sub(1);
            } else {
                self.count = 0;
            }
            false
        }
    }
}
