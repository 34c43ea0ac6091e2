//! Per-resource outcomes accumulated over a run.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Collection,
    Field,
    Permission,
    Item,
    Access,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Collection => "collection",
            Self::Field => "field",
            Self::Permission => "permission",
            Self::Item => "item",
            Self::Access => "access",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Created,
    /// Already present; no creation request was issued.
    Skipped,
    /// Read check succeeded.
    Verified,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceOutcome {
    pub kind: ResourceKind,
    /// `collection` or `collection.field`.
    pub target: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ResourceOutcome {
    pub fn new(kind: ResourceKind, target: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            kind,
            target: target.into(),
            status,
        }
    }

    pub fn failed(
        kind: ResourceKind,
        target: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::new(
            kind,
            target,
            OutcomeStatus::Failed {
                reason: reason.to_string(),
            },
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub created: usize,
    pub skipped: usize,
    pub verified: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} skipped, {} verified, {} failed",
            self.created, self.skipped, self.verified, self.failed
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<ResourceOutcome>,
}

impl RunReport {
    pub fn push(&mut self, outcome: ResourceOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                OutcomeStatus::Created => summary.created += 1,
                OutcomeStatus::Skipped => summary.skipped += 1,
                OutcomeStatus::Verified => summary.verified += 1,
                OutcomeStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(ResourceOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failure())
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes
            .iter()
            .filter(move |outcome| outcome.kind == kind)
    }
}
