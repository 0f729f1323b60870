use std::{fs, path::Path};

use log::{debug, warn};

use crate::error::{Result, SupervisorError};
use crate::models::process::ProcessSpec;

const TIMELIMIT_KEY: &str = "timelimit";

/// A validated run description: time budget in seconds plus the processes
/// to launch, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub timelimit: u64,
    pub specs: Vec<ProcessSpec>,
}

pub fn load(path: &Path) -> Result<SupervisorConfig> {
    if !path.exists() {
        return Err(SupervisorError::ConfigNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|source| SupervisorError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents)
}

/// Parses the config text.
///
/// ```text
/// timelimit 10
/// ./programs/pi_n 1000
/// /bin/sleep 3
/// ```
///
/// The first meaningful line must be the time limit. Blank lines and lines
/// starting with `#` are skipped.
pub fn parse(contents: &str) -> Result<SupervisorConfig> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (line_no, first) = lines.next().ok_or_else(|| SupervisorError::Config {
        line: 1,
        reason: format!("missing '{} <seconds>' line", TIMELIMIT_KEY),
    })?;
    let timelimit = validate_timelimit_line(first, line_no)?;

    let specs: Vec<ProcessSpec> = lines
        .filter_map(|(_, line)| {
            let argv = line.split_whitespace().map(str::to_string).collect();
            ProcessSpec::from_argv(argv)
        })
        .collect();

    if specs.is_empty() {
        warn!("Config lists no processes");
    }
    debug!("Parsed config: timelimit {}s, {} processes", timelimit, specs.len());

    Ok(SupervisorConfig { timelimit, specs })
}

pub fn validate_timelimit_line(line: &str, line_no: usize) -> Result<u64> {
    let invalid = |reason: String| SupervisorError::Config {
        line: line_no,
        reason,
    };

    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some(TIMELIMIT_KEY) => {}
        _ => {
            return Err(invalid(format!(
                "expected '{} <seconds>', found '{}'",
                TIMELIMIT_KEY, line
            )))
        }
    }

    let value = tokens
        .next()
        .ok_or_else(|| invalid("time limit value is missing".to_string()))?;
    if let Some(extra) = tokens.next() {
        return Err(invalid(format!("unexpected '{}' after time limit", extra)));
    }

    match value.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(invalid(format!(
            "time limit '{}' is not a positive integer",
            value
        ))),
    }
}
