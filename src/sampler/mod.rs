pub mod system;

pub use system::SystemSampler;

/// Point-in-time resource consumption of one process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    /// Cumulative CPU time over wall time since the process started.
    pub cpu_percent: u32,
    pub memory_mb: f64,
}

/// Source of resource samples for a live pid.
///
/// A process can exit between the liveness poll and the sample, so
/// implementations return `None` instead of an error when it is gone.
pub trait ResourceSampler {
    fn sample(&mut self, pid: u32) -> Option<ResourceUsage>;
}
