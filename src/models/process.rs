use std::{
    os::unix::process::ExitStatusExt,
    path::PathBuf,
    process::{Child, ExitStatus},
};

/// A configured executable plus the argument vector it is started with.
/// `args[0]` is the program path as written in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub path: PathBuf,
    pub args: Vec<String>,
}

impl ProcessSpec {
    pub fn new(path: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }

    /// Builds a spec from a full argv, using the first entry as the path.
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let path = PathBuf::from(argv.first()?);
        Some(Self::new(path, argv))
    }

    pub fn program_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    FailedToStart,
    Running,
    ExitedNormally,
    Terminated,
}

impl ProcessState {
    pub fn is_terminal(self) -> bool {
        self != ProcessState::Running
    }
}

#[derive(Debug)]
pub struct ProcessRecord {
    pub index: usize,
    pub spec: ProcessSpec,
    pub state: ProcessState,
    pub was_terminated: bool,
    pub exit_code: Option<i32>,
    child: Option<Child>,
}

impl ProcessRecord {
    pub fn failed(index: usize, spec: ProcessSpec) -> Self {
        Self {
            index,
            spec,
            state: ProcessState::FailedToStart,
            was_terminated: false,
            exit_code: None,
            child: None,
        }
    }

    pub fn running(index: usize, spec: ProcessSpec, child: Child) -> Self {
        Self {
            index,
            spec,
            state: ProcessState::Running,
            was_terminated: false,
            exit_code: None,
            child: Some(child),
        }
    }

    /// The OS pid, only while the child has not been reaped.
    pub fn pid(&self) -> Option<u32> {
        match self.state {
            ProcessState::Running => self.child.as_ref().map(Child::id),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut Child> {
        self.child.as_mut()
    }

    /// Leaves `Running` after the child has been reaped with `status`.
    /// The child handle is dropped here, so the pid can never be polled again.
    pub(crate) fn settle(&mut self, status: ExitStatus, killed_by_supervisor: bool) {
        self.child = None;
        if killed_by_supervisor || status.signal().is_some() {
            self.state = ProcessState::Terminated;
            self.was_terminated = true;
        } else {
            self.state = ProcessState::ExitedNormally;
            self.exit_code = status.code();
        }
    }
}
