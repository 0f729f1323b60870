use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("{0} not found")]
    ConfigNotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config at line {line}: {reason}")]
    Config { line: usize, reason: String },

    #[error("Failed to create process for {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to kill process {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to reap process {pid}: {source}")]
    Reap {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install {signal} handler: {source}")]
    SignalInstall {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
