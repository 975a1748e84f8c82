// Order submission and position supervision
pub mod executor;
pub mod monitor;

pub use executor::OrderExecutor;
pub use monitor::{MonitorOutcome, PositionMonitor};
