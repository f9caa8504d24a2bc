//! Process memory snapshots logged around engine solves.

use std::time::Instant;
use sysinfo::System;

/// Resident set size of this process at a named stage.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    pub rss_bytes: u64,
    pub timestamp: Instant,
    pub stage: String,
}

#[derive(Debug, Clone)]
pub enum MemoryError {
    ProcessNotFound { pid: u32 },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProcessNotFound { pid } => {
                write!(f, "failed to locate process {}", pid)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

impl MemorySnapshot {
    /// Capture current memory state for a given stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the current process cannot be located.
    pub fn capture(stage: &str) -> Result<Self, MemoryError> {
        let pid = sysinfo::Pid::from(std::process::id() as usize);

        // Refresh only this process.
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            sysinfo::ProcessesToUpdate::Some(&[pid]),
            true,
            sysinfo::ProcessRefreshKind::nothing().with_memory(),
        );

        let process = sys.process(pid).ok_or(MemoryError::ProcessNotFound {
            pid: std::process::id(),
        })?;

        Ok(MemorySnapshot {
            rss_bytes: process.memory(),
            timestamp: Instant::now(),
            stage: stage.to_string(),
        })
    }

    /// Difference in RSS bytes (positive means growth).
    pub fn diff(&self, other: &Self) -> i64 {
        self.rss_bytes as i64 - other.rss_bytes as i64
    }
}

/// RSS in bytes, or `None` when the platform does not report it.
pub fn capture_rss_bytes(stage: &str) -> Option<u64> {
    MemorySnapshot::capture(stage)
        .ok()
        .map(|snapshot| snapshot.rss_bytes)
}

pub fn rss_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    match (before, after) {
        (Some(before), Some(after)) => Some(after as i64 - before as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_reports_nonzero_rss() {
        let snapshot = MemorySnapshot::capture("test").unwrap();
        assert!(snapshot.rss_bytes > 0);
        assert_eq!(snapshot.stage, "test");
    }

    #[test]
    fn diff_is_signed() {
        let now = Instant::now();
        let small = MemorySnapshot {
            rss_bytes: 100,
            timestamp: now,
            stage: "a".to_string(),
        };
        let large = MemorySnapshot {
            rss_bytes: 250,
            timestamp: now,
            stage: "b".to_string(),
        };
        assert_eq!(large.diff(&small), 150);
        assert_eq!(small.diff(&large), -150);
    }

    #[test]
    fn rss_delta_needs_both_sides() {
        assert_eq!(rss_delta(Some(10), Some(4)), Some(-6));
        assert_eq!(rss_delta(None, Some(4)), None);
    }
}
