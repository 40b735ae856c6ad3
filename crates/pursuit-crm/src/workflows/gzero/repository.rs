use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentId, AssessmentStatus, ConditionItem, Decision, ProjectId, ScoreEntry,
};
use super::evaluation::{CriterionContribution, ScoreSummary};

/// Repository record for one project's go/no-go assessment. `total_score` and
/// `max_score` are denormalized from the latest evaluation so list reads do
/// not have to re-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub assessment_id: AssessmentId,
    pub project_id: ProjectId,
    pub status: AssessmentStatus,
    pub decision: Decision,
    pub scores: BTreeMap<String, ScoreEntry>,
    pub conditions: Vec<ConditionItem>,
    pub total_score: f64,
    pub max_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn view(&self, summary: ScoreSummary) -> AssessmentView {
        AssessmentView {
            assessment_id: self.assessment_id.clone(),
            project_id: self.project_id.clone(),
            status: self.status,
            status_label: self.status.label(),
            decision: self.decision,
            decision_label: self.decision.label(),
            classified: summary.decision,
            classified_label: summary.decision.label(),
            weighted_total: summary.weighted_total,
            max_score: summary.max_possible,
            scored_criteria: summary.scored_criteria,
            total_criteria: summary.total_criteria,
            all_scored: summary.all_scored,
            contributions: summary.contributions,
            conditions: self.conditions.clone(),
            weight_warning: summary.weight_warning,
            updated_at: self.updated_at,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn fetch_by_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Assessment representation exposed through the API: stored state plus the
/// freshly recomputed evaluation. `decision` is what a reviewer recorded;
/// `classified` is what the current score implies.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub assessment_id: AssessmentId,
    pub project_id: ProjectId,
    pub status: AssessmentStatus,
    pub status_label: &'static str,
    pub decision: Decision,
    pub decision_label: &'static str,
    pub classified: Decision,
    pub classified_label: &'static str,
    pub weighted_total: f64,
    pub max_score: f64,
    pub scored_criteria: usize,
    pub total_criteria: usize,
    pub all_scored: bool,
    pub contributions: Vec<CriterionContribution>,
    pub conditions: Vec<ConditionItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_warning: Option<String>,
    pub updated_at: DateTime<Utc>,
}
