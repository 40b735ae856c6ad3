use serde::{Deserialize, Serialize};

use super::domain::ProjectId;
use super::evaluation::ScoringEngine;
use super::repository::{AssessmentRecord, RepositoryError};

/// Outcome of the project-level activity gating rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityGate {
    pub allowed: bool,
    pub reason: String,
}

impl ActivityGate {
    fn blocked(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }

    fn allowed(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }
}

/// Pure policy over assessment state: activities may only be created once the
/// project's assessment has scores and clears the conditional threshold.
/// Approval status is deliberately not consulted; a scored draft passes.
pub fn activity_gate(assessment: Option<&AssessmentRecord>, engine: &ScoringEngine) -> ActivityGate {
    let record = match assessment {
        Some(record) => record,
        None => return ActivityGate::blocked("project has no go/no-go assessment"),
    };

    if record.scores.is_empty() {
        return ActivityGate::blocked("assessment has no recorded scores");
    }

    let summary = engine.evaluate(&record.scores);
    let conditional = engine.thresholds().conditional;
    if summary.weighted_total < conditional {
        return ActivityGate::blocked(format!(
            "weighted score {:.2} is below the conditional threshold {:.2}",
            summary.weighted_total, conditional
        ));
    }

    ActivityGate::allowed(format!(
        "weighted score {:.2} clears the conditional threshold {:.2}",
        summary.weighted_total, conditional
    ))
}

/// Seam through which the pipeline consults assessment state without
/// depending on the assessment service's internals.
pub trait ActivityGatekeeper: Send + Sync {
    fn activity_gate(&self, project_id: &ProjectId) -> Result<ActivityGate, RepositoryError>;
}
