pub mod app;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod monitor;
pub mod report;
pub mod sampler;
pub mod signal;

pub use error::{Result, SupervisorError};
