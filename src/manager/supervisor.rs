use std::{io::Write, time::Duration};

use log::{info, warn};

use crate::error::Result;
use crate::manager::{
    launcher::{launch, LaunchResult},
    table::ProcessTable,
};
use crate::models::process::{ProcessRecord, ProcessSpec};
use crate::report::Reporter;
use crate::sampler::ResourceSampler;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);
pub const DEFAULT_REPORT_PERIOD: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub tick: Duration,
    /// Periodic report every this many ticks.
    pub report_period: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            report_period: DEFAULT_REPORT_PERIOD,
        }
    }
}

/// All mutable state of one supervision run.
///
/// `running` mirrors the number of records in `Running` and is what the
/// monitor loop checks for completion. `elapsed` counts ticks and only the
/// monitor loop advances it.
#[derive(Debug)]
pub struct Supervisor {
    table: ProcessTable,
    running: usize,
    elapsed: u64,
    settings: MonitorSettings,
}

impl Supervisor {
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            table: ProcessTable::default(),
            running: 0,
            elapsed: 0,
            settings,
        }
    }

    /// Launches every spec in order, emitting one line per attempt.
    pub fn launch_all<W: Write, S: ResourceSampler>(
        &mut self,
        specs: Vec<ProcessSpec>,
        reporter: &mut Reporter<W, S>,
    ) -> Result<()> {
        for spec in specs {
            let index = self.table.len();
            match launch(spec, index)? {
                LaunchResult::Started(record) => {
                    self.running += 1;
                    let record = self.table.push(record);
                    reporter.launched(record)?;
                }
                LaunchResult::FailedToStart(record) => {
                    let record = self.table.push(record);
                    reporter.launch_failed(record)?;
                }
            }
        }
        info!(
            "Launched {} of {} processes",
            self.running,
            self.table.len()
        );
        Ok(())
    }

    pub fn records(&self) -> &[ProcessRecord] {
        self.table.records()
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn running_count(&self) -> usize {
        self.running
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> Option<&mut ProcessRecord> {
        self.table.get_mut(index)
    }

    pub(crate) fn advance(&mut self) -> u64 {
        self.elapsed += 1;
        self.elapsed
    }

    /// Called once for every record that has left `Running`.
    pub(crate) fn process_finished(&mut self) {
        debug_assert!(self.running > 0, "running-count underflow");
        self.running = self.running.saturating_sub(1);
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        // Normal runs end with nothing to do here. On error paths this keeps
        // children from outliving the supervisor as zombies.
        for record in self.table.iter_mut() {
            let Some(child) = record.child_mut() else {
                continue;
            };
            let pid = child.id();
            if let Err(e) = child.kill() {
                warn!("Failed to kill leftover process {}: {}", pid, e);
            }
            match child.wait() {
                Ok(status) => record.settle(status, true),
                Err(e) => warn!("Failed to reap leftover process {}: {}", pid, e),
            }
        }
    }
}
