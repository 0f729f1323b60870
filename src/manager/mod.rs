pub mod launcher;
pub mod supervisor;
pub mod table;

pub use supervisor::{MonitorSettings, Supervisor};
