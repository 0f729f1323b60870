use std::{
    fs,
    io::{self, ErrorKind},
    os::unix::process::CommandExt,
    path::{Path, PathBuf},
    process::Command,
};

use log::{info, warn};

use crate::error::{Result, SupervisorError};
use crate::models::process::{ProcessRecord, ProcessSpec};

#[derive(Debug)]
pub enum LaunchResult {
    Started(ProcessRecord),
    FailedToStart(ProcessRecord),
}

impl LaunchResult {
    pub fn into_record(self) -> ProcessRecord {
        match self {
            LaunchResult::Started(record) | LaunchResult::FailedToStart(record) => record,
        }
    }
}

/// Starts `spec` as a child process with the inherited environment and stdio.
///
/// A missing executable, or one the kernel refuses to exec, yields
/// `FailedToStart` and no process. A failure of process creation itself
/// (fork-level resource exhaustion) is returned as an error and ends the run.
pub fn launch(spec: ProcessSpec, index: usize) -> Result<LaunchResult> {
    if let Err(e) = fs::metadata(&spec.path) {
        warn!("Process {} executable {} unavailable: {}", index, spec.path.display(), e);
        return Ok(LaunchResult::FailedToStart(ProcessRecord::failed(index, spec)));
    }

    let mut command = Command::new(executable_path(&spec.path));
    if let Some((arg0, rest)) = spec.args.split_first() {
        command.arg0(arg0).args(rest);
    }

    match command.spawn() {
        Ok(child) => {
            info!("Started process {} '{}' with pid {}", index, spec.joined_args(), child.id());
            Ok(LaunchResult::Started(ProcessRecord::running(index, spec, child)))
        }
        Err(e) if is_exec_failure(&e) => {
            warn!("Process {} executable {} cannot be run: {}", index, spec.path.display(), e);
            Ok(LaunchResult::FailedToStart(ProcessRecord::failed(index, spec)))
        }
        Err(source) => Err(SupervisorError::Spawn {
            path: spec.path,
            source,
        }),
    }
}

/// Errors reported from the exec stage concern this one entry only.
fn is_exec_failure(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::PermissionDenied | ErrorKind::NotFound)
        || matches!(
            e.raw_os_error(),
            Some(libc::ENOEXEC | libc::EISDIR | libc::ENOTDIR | libc::ELOOP | libc::ENAMETOOLONG)
        )
}

/// Paths without a directory component are taken relative to the working
/// directory rather than looked up on `PATH`.
fn executable_path(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new(".").join(path),
        _ => path.to_path_buf(),
    }
}
