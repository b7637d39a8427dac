//! Aggregated outcome of a run

use super::state::TargetStage;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunAction {
    Package,
    Clean,
}

impl fmt::Display for RunAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunAction::Package => f.write_str("package"),
            RunAction::Clean => f.write_str("clean"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    Completed,
    Skipped { reason: String },
    Failed { error: String },
}

/// Final state of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub function: String,
    /// Last stage the target reached
    pub stage: TargetStage,
    #[serde(flatten)]
    pub status: TargetStatus,
}

impl TargetOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, TargetStatus::Failed { .. })
    }
}

/// Per-target outcomes of one run, in selection order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub action: RunAction,
    pub targets: Vec<TargetOutcome>,
}

impl RunReport {
    pub fn new(action: RunAction) -> Self {
        Self {
            action,
            targets: Vec::new(),
        }
    }

    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Completed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Failed { .. }))
    }

    /// A run fails as a whole when any target failed fatally
    pub fn has_failures(&self) -> bool {
        self.targets.iter().any(TargetOutcome::is_failed)
    }

    fn count(&self, predicate: impl Fn(&TargetStatus) -> bool) -> usize {
        self.targets.iter().filter(|t| predicate(&t.status)).count()
    }
}
