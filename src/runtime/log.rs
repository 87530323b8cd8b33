//! Engine log sink
//!
//! Every stage boundary and every recovered error is reported as a single
//! line to an [`EngineLog`]. The default sink forwards to `tracing`; the
//! in-memory sink keeps the lines so callers can inspect a run afterwards.

use std::sync::Mutex;

use tracing::info;

/// A single-argument "log a line" collaborator
pub trait EngineLog: Send + Sync {
    fn log(&self, message: &str);
}

/// Forwards engine lines to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl EngineLog for TracingLog {
    fn log(&self, message: &str) {
        info!(target: "slizzai::engine", "[Engine] {}", message);
    }
}

/// Records engine lines in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line logged so far, oldest first
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether any logged line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// Number of logged lines containing `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl EngineLog for MemoryLog {
    fn log(&self, message: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_keeps_order() {
        let log = MemoryLog::new();
        log.log("first");
        log.log("second");

        assert_eq!(log.lines(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_memory_log_matching() {
        let log = MemoryLog::new();
        log.log("Starting step: Codex_Enhancement");
        log.log("Completed step: Codex_Enhancement");
        log.log("Starting step: Asset_Calibration");

        assert!(log.contains("Asset_Calibration"));
        assert_eq!(log.count_matching("Starting step"), 2);
        assert_eq!(log.count_matching("Zen"), 0);
    }
}
