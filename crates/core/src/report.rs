use crate::error::{BatchError, FailureKind, RenameFailure};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Renamed,
    Copied,
    Unchanged,
    Failed { kind: FailureKind, message: String },
}

impl From<&RenameFailure> for OutcomeStatus {
    fn from(failure: &RenameFailure) -> Self {
        Self::Failed {
            kind: failure.kind(),
            message: failure.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub original_name: String,
    pub new_name: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl FileOutcome {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.status {
            OutcomeStatus::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub matched: usize,
    pub renamed: usize,
    pub copied: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Record of one batch run. Files left untouched by a partial failure are only
/// visible here and in the log.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub folder: PathBuf,
    pub extension: String,
    pub copy_mode: bool,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub aborted: Option<BatchError>,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| outcome.failure_kind().is_some())
    }

    pub fn stats(&self) -> BatchStats {
        let mut stats = BatchStats {
            matched: self.outcomes.len(),
            ..BatchStats::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                OutcomeStatus::Renamed => stats.renamed += 1,
                OutcomeStatus::Copied => stats.copied += 1,
                OutcomeStatus::Unchanged => stats.unchanged += 1,
                OutcomeStatus::Failed { .. } => stats.failed += 1,
            }
        }
        stats
    }

    pub fn outcome_for(&self, original_name: &str) -> Option<&FileOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.original_name == original_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: OutcomeStatus) -> FileOutcome {
        FileOutcome {
            original_name: name.to_string(),
            new_name: format!("new_{name}"),
            status,
        }
    }

    #[test]
    fn stats_count_each_status() {
        let now = Local::now();
        let report = BatchReport {
            folder: PathBuf::from("/tmp/x"),
            extension: "txt".to_string(),
            copy_mode: false,
            started_at: now,
            finished_at: now,
            aborted: None,
            outcomes: vec![
                outcome("a.txt", OutcomeStatus::Renamed),
                outcome("b.txt", OutcomeStatus::Unchanged),
                outcome(
                    "c.txt",
                    OutcomeStatus::from(&RenameFailure::TargetExists(PathBuf::from("x"))),
                ),
            ],
        };

        let stats = report.stats();
        assert_eq!(stats.matched, 3);
        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.failed, 1);
        assert!(report.has_failures());
        assert_eq!(
            report.outcome_for("c.txt").and_then(FileOutcome::failure_kind),
            Some(FailureKind::TargetExists)
        );
    }

    #[test]
    fn outcome_serializes_with_flat_status() {
        let value = serde_json::to_value(outcome(
            "a.txt",
            OutcomeStatus::from(&RenameFailure::SourceMissing(PathBuf::from("a.txt"))),
        ))
        .expect("serialize");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["kind"], "source_missing");
        assert_eq!(value["original_name"], "a.txt");
    }
}
