pub mod session;

pub use session::{MonitorStatus, Session, SessionStats, Severity, SignalType, Violation};
