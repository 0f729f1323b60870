use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use log::debug;

use super::{ResourceSampler, ResourceUsage};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Samples CPU and memory of a single pid through `sysinfo`.
///
/// Only the requested pid is refreshed on each call.
pub struct SystemSampler {
    system: System,
}

impl SystemSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for SystemSampler {
    fn sample(&mut self, pid: u32) -> Option<ResourceUsage> {
        let pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let Some(process) = self.system.process(pid) else {
            debug!("Process {} gone before sampling", pid);
            return None;
        };
        usage_from(
            process.accumulated_cpu_time(),
            process.run_time(),
            process.memory(),
        )
    }
}

/// Cumulative CPU time (ms) over lifetime (s), plus resident memory.
/// A lifetime of zero gives no measurement.
fn usage_from(cpu_time_ms: u64, run_time_secs: u64, memory_bytes: u64) -> Option<ResourceUsage> {
    if run_time_secs == 0 {
        return None;
    }
    let cpu_secs = cpu_time_ms as f64 / 1000.0;

    Some(ResourceUsage {
        cpu_percent: (cpu_secs / run_time_secs as f64 * 100.0) as u32,
        memory_mb: memory_bytes as f64 / BYTES_PER_MB,
    })
}
