//! External Sample Sources
//!
//! Pluggable collaborators that push data into the collector from the
//! host environment. The core never branches on its environment;
//! hosts inject whichever sources apply and drive them on their own
//! timers (e.g. memory every 5 s, sweep every 60 s).

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};

/// One memory observation from a host memory source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemorySample {
    /// Used (resident) memory in MB
    pub used_mb: f64,
    /// Total memory visible to the process in MB
    pub total_mb: f64,
    /// Upper limit the host enforces, in MB; equals `total_mb` when
    /// the host has no tighter limit
    pub limit_mb: f64,
}

/// Capability: something that can produce memory samples on demand
pub trait MemorySampleSource {
    /// Take one sample; `None` when the source cannot read memory
    fn sample(&mut self) -> Option<MemorySample>;
}

/// Memory source reading process RSS and system totals via `sysinfo`
pub struct SystemMemorySource {
    system: System,
}

impl SystemMemorySource {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        Self { system }
    }
}

impl Default for SystemMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampleSource for SystemMemorySource {
    fn sample(&mut self) -> Option<MemorySample> {
        self.system.refresh_all();

        let pid = Pid::from_u32(std::process::id());
        let used_mb = self
            .system
            .process(pid)
            .map(|process| process.memory() as f64 / (1024.0 * 1024.0))?;
        let total_mb = self.system.total_memory() as f64 / (1024.0 * 1024.0);

        Some(MemorySample {
            used_mb,
            total_mb,
            limit_mb: total_mb,
        })
    }
}

/// A failure captured by a host unhandled-error hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedError {
    /// Where the failure surfaced (e.g. "unhandled", "rejection")
    pub context: String,
    /// The failure's message
    pub message: String,
}

/// Capability: a host hook that accumulates uncaught failures between
/// pump cycles
pub trait UnhandledErrorSource {
    /// Drain failures captured since the last call
    fn drain(&mut self) -> Vec<CapturedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_source_reads_own_process() {
        let mut source = SystemMemorySource::new();
        let sample = source.sample().expect("own process must be visible");
        assert!(sample.used_mb > 0.0);
        assert!(sample.total_mb >= sample.used_mb);
        assert_eq!(sample.limit_mb, sample.total_mb);
    }

    #[test]
    fn test_repeated_samples() {
        let mut source = SystemMemorySource::new();
        assert!(source.sample().is_some());
        assert!(source.sample().is_some());
    }
}
