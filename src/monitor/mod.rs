#[allow(clippy::module_inception)]
pub mod monitor;

pub use monitor::{monitor, MonitorOutcome};
