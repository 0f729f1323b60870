use std::fmt;

/// Why the monitor loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    AllExited,
    TimeLimit,
    Signal(i32),
}

/// Header printed above a report block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMessage {
    Starting,
    Periodic,
    Final(StopReason),
}

impl From<StopReason> for ReportMessage {
    fn from(reason: StopReason) -> Self {
        ReportMessage::Final(reason)
    }
}

pub fn signal_name(signal: i32) -> String {
    match signal {
        libc::SIGINT => "SIGINT".to_string(),
        libc::SIGABRT => "SIGABRT".to_string(),
        libc::SIGTERM => "SIGTERM".to_string(),
        other => format!("signal {}", other),
    }
}

impl fmt::Display for ReportMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMessage::Starting => write!(f, "Starting report"),
            ReportMessage::Periodic => write!(f, "Normal report"),
            ReportMessage::Final(StopReason::AllExited) => {
                write!(f, "Final report, all processes finished")
            }
            ReportMessage::Final(StopReason::TimeLimit) => {
                write!(f, "Final report, time limit reached")
            }
            ReportMessage::Final(StopReason::Signal(signal)) => {
                write!(f, "Signal received ({}), terminating", signal_name(*signal))
            }
        }
    }
}
