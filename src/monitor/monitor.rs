use std::io::Write;

use crossbeam_channel::tick;
use log::{debug, error, info, warn};

use crate::error::{Result, SupervisorError};
use crate::manager::Supervisor;
use crate::models::{
    message::{signal_name, ReportMessage, StopReason},
    process::ProcessRecord,
};
use crate::report::Reporter;
use crate::sampler::ResourceSampler;
use crate::signal::SignalBridge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOutcome {
    pub reason: StopReason,
    /// Ticks elapsed when the loop stopped.
    pub elapsed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Idle,
    StillRunning,
    Exited,
    TimedOut,
}

/// Drives the supervisor until every process is done, the time limit has
/// killed the rest, or a shutdown signal arrives. Emits the final report
/// before returning.
///
/// `timelimit` is counted in ticks of `supervisor.settings().tick`.
pub fn monitor<W: Write, S: ResourceSampler>(
    supervisor: &mut Supervisor,
    timelimit: u64,
    signals: &SignalBridge,
    reporter: &mut Reporter<W, S>,
) -> Result<MonitorOutcome> {
    if supervisor.running_count() == 0 {
        info!("No process running, nothing to monitor");
        return finish(supervisor, StopReason::AllExited, reporter);
    }

    let settings = supervisor.settings();
    let ticker = tick(settings.tick);

    loop {
        // A tick receiver never disconnects.
        let _ = ticker.recv();

        if signals.shutdown_requested() {
            let signal = signals.received_signal().unwrap_or(libc::SIGINT);
            warn!(
                "{} received, terminating {} processes",
                signal_name(signal),
                supervisor.running_count()
            );
            terminate_all(supervisor)?;
            return finish(supervisor, StopReason::Signal(signal), reporter);
        }

        let elapsed = supervisor.advance();
        let deadline_passed = elapsed >= timelimit;
        let mut timed_out = false;

        for index in 0..supervisor.table().len() {
            if poll(supervisor, index, deadline_passed)? == PollOutcome::TimedOut {
                timed_out = true;
            }
        }
        debug_assert_eq!(supervisor.running_count(), supervisor.table().count_running());

        if supervisor.running_count() == 0 {
            let reason = if timed_out {
                StopReason::TimeLimit
            } else {
                StopReason::AllExited
            };
            return finish(supervisor, reason, reporter);
        }

        if settings.report_period > 0 && elapsed % settings.report_period == 0 {
            reporter.report(supervisor.records(), ReportMessage::Periodic)?;
        }
    }
}

/// Non-blocking liveness check of one record, killing it once the deadline
/// has passed.
fn poll(supervisor: &mut Supervisor, index: usize, deadline_passed: bool) -> Result<PollOutcome> {
    let Some(record) = supervisor.record_mut(index) else {
        return Ok(PollOutcome::Idle);
    };
    let Some(child) = record.child_mut() else {
        return Ok(PollOutcome::Idle);
    };
    let pid = child.id();

    let outcome = match child.try_wait() {
        Ok(Some(status)) => {
            record.settle(status, false);
            debug!("Process {} (pid {}) finished: {}", index, pid, status);
            PollOutcome::Exited
        }
        Ok(None) if deadline_passed => {
            kill_and_reap(record)?;
            info!("Process {} (pid {}) killed at time limit", index, pid);
            PollOutcome::TimedOut
        }
        Ok(None) => return Ok(PollOutcome::StillRunning),
        Err(source) => {
            error!("Polling process {} (pid {}) failed: {}", index, pid, source);
            return Err(SupervisorError::Reap { pid, source });
        }
    };

    supervisor.process_finished();
    Ok(outcome)
}

/// Sends SIGKILL and blocks until the child is collected.
fn kill_and_reap(record: &mut ProcessRecord) -> Result<()> {
    let Some(child) = record.child_mut() else {
        return Ok(());
    };
    let pid = child.id();

    child
        .kill()
        .map_err(|source| SupervisorError::Kill { pid, source })?;
    let status = child
        .wait()
        .map_err(|source| SupervisorError::Reap { pid, source })?;

    record.settle(status, true);
    Ok(())
}

fn terminate_all(supervisor: &mut Supervisor) -> Result<()> {
    for index in 0..supervisor.table().len() {
        let Some(record) = supervisor.record_mut(index) else {
            continue;
        };
        if !record.is_running() {
            continue;
        }
        kill_and_reap(record)?;
        supervisor.process_finished();
    }
    Ok(())
}

fn finish<W: Write, S: ResourceSampler>(
    supervisor: &Supervisor,
    reason: StopReason,
    reporter: &mut Reporter<W, S>,
) -> Result<MonitorOutcome> {
    reporter.report(supervisor.records(), ReportMessage::Final(reason))?;
    Ok(MonitorOutcome {
        reason,
        elapsed: supervisor.elapsed(),
    })
}
