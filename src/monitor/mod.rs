pub mod clock;
pub mod controller;
pub mod events;
pub(crate) mod loop_worker;

pub use clock::SessionClock;
pub use controller::{DashboardSnapshot, ProctorController, SessionSummary};
pub use events::{EventBus, ProctorEvent};
