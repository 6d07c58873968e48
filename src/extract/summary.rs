use crate::extract::pipeline::EntryOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Accumulated result of one run. Built by threading a single value through
/// the extraction loop; nothing about a run is shared or global.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Entries considered, including unidentifiable ones.
    pub total: usize,
    /// Extracted or already-extracted keys.
    pub succeeded: usize,
    /// Keys whose extraction failed, in input order.
    pub failed: Vec<String>,
    /// Entries with no recognizable key (not failures).
    pub skipped: usize,
    /// True when the run stopped between entries on an interrupt.
    pub interrupted: bool,
    pub duration: Duration,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: Vec::new(),
            skipped: 0,
            interrupted: false,
            duration: Duration::ZERO,
            finished_at: Utc::now(),
        }
    }

    pub fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Extracted { .. } | EntryOutcome::AlreadyExtracted { .. } => {
                self.succeeded += 1;
            }
            EntryOutcome::Unidentifiable => {
                self.skipped += 1;
            }
            EntryOutcome::Failed { key, .. } => {
                self.failed.push(key.clone());
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_classification() {
        let mut summary = RunSummary::new(4);

        summary.record(&EntryOutcome::Extracted {
            key: "cve-2021-23376".to_string(),
        });
        summary.record(&EntryOutcome::AlreadyExtracted {
            key: "cve-2024-25620".to_string(),
        });
        summary.record(&EntryOutcome::Unidentifiable);
        summary.record(&EntryOutcome::Failed {
            key: "cve-2019-1".to_string(),
            reason: "copy failed".to_string(),
        });

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, vec!["cve-2019-1"]);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_clean_run() {
        let mut summary = RunSummary::new(1);
        summary.record(&EntryOutcome::Extracted {
            key: "cve-2021-23376".to_string(),
        });
        assert!(summary.is_clean());

        summary.interrupted = true;
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_serializes_to_json() {
        let summary = RunSummary::new(0);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"total\":0"));
        assert!(json.contains("\"interrupted\":false"));
    }
}
