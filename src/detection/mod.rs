pub mod debounce;
pub mod recorder;
pub mod risk;
pub mod sampler;

pub use debounce::DebounceCounter;
pub use recorder::{RecordOutcome, ViolationRecorder};
pub use risk::{attention_score, risk_tier, RiskTier};
pub use sampler::{SequenceSampler, SignalSampler, ThreadRngSampler};
