use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::audit::{AuditError, AuditEvent, AuditSink};

use super::catalog::ScoreError;
use super::domain::{
    AssessmentId, AssessmentStatus, ConditionItem, Decision, ProjectId, ScoreEntry,
};
use super::evaluation::{DecisionThresholds, ScoreSummary, ScoringEngine};
use super::gate::{activity_gate, ActivityGate, ActivityGatekeeper};
use super::lifecycle::{
    ensure_can_decide, ensure_can_start_review, ensure_can_submit, status_for_decision,
    LifecycleError,
};
use super::repository::{AssessmentRecord, AssessmentRepository, RepositoryError};

/// Service composing the scoring engine, assessment repository, and audit
/// trail. All state transitions run through here.
pub struct GzeroAssessmentService<R, A> {
    repository: Arc<R>,
    audit: Arc<A>,
    engine: Arc<ScoringEngine>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("g0-{id:06}"))
}

impl<R, A> GzeroAssessmentService<R, A>
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    pub fn new(repository: Arc<R>, audit: Arc<A>, engine: ScoringEngine) -> Self {
        Self {
            repository,
            audit,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Evaluate a record's scores with the canonical thresholds.
    pub fn summarize(&self, record: &AssessmentRecord) -> ScoreSummary {
        self.engine.evaluate(&record.scores)
    }

    /// Fetch the assessment for a project, creating an empty draft on first
    /// visit.
    pub fn assessment_for_project(
        &self,
        project_id: &ProjectId,
        actor: &str,
    ) -> Result<AssessmentRecord, GzeroServiceError> {
        if let Some(record) = self.repository.fetch_by_project(project_id)? {
            return Ok(record);
        }

        let now = Utc::now();
        let record = AssessmentRecord {
            assessment_id: next_assessment_id(),
            project_id: project_id.clone(),
            status: AssessmentStatus::Draft,
            decision: Decision::Pending,
            scores: BTreeMap::new(),
            conditions: Vec::new(),
            total_score: 0.0,
            max_score: self.engine.catalog().max_possible(),
            created_at: now,
            updated_at: now,
        };
        let stored = self.repository.insert(record)?;

        self.audit.record(
            AuditEvent::new(actor, "assessment_created", stored.assessment_id.0.clone())
                .detail("project_id", stored.project_id.0.clone()),
        )?;

        Ok(stored)
    }

    /// Merge score entries into an assessment. One entry per criterion; later
    /// writes overwrite earlier ones. `revert_to_draft` forces the record
    /// back to draft from any state, clearing the recorded decision and
    /// conditions.
    pub fn save_scores(
        &self,
        assessment_id: &AssessmentId,
        entries: Vec<ScoreEntry>,
        revert_to_draft: bool,
        actor: &str,
    ) -> Result<AssessmentRecord, GzeroServiceError> {
        let mut record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;

        for entry in &entries {
            self.engine.catalog().validate_entry(entry)?;
        }
        for entry in entries {
            record.scores.insert(entry.criterion_id.clone(), entry);
        }

        if revert_to_draft {
            record.status = AssessmentStatus::Draft;
            record.decision = Decision::Pending;
            record.conditions.clear();
        }

        let summary = self.engine.evaluate(&record.scores);
        record.total_score = summary.weighted_total;
        record.max_score = summary.max_possible;
        record.updated_at = Utc::now();

        self.repository.update(record.clone())?;

        self.audit.record(
            AuditEvent::new(actor, "scores_saved", record.assessment_id.0.clone())
                .detail("scored", format!("{}/{}", summary.scored_criteria, summary.total_criteria))
                .detail("weighted_total", format!("{:.2}", summary.weighted_total))
                .detail("revert_to_draft", revert_to_draft.to_string()),
        )?;

        Ok(record)
    }

    /// Submit for review. Refused unless every catalog criterion is scored,
    /// so a partial sum can never masquerade as a final score.
    pub fn submit(
        &self,
        assessment_id: &AssessmentId,
        actor: &str,
    ) -> Result<AssessmentRecord, GzeroServiceError> {
        let mut record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;

        ensure_can_submit(record.status)?;

        let summary = self.engine.evaluate(&record.scores);
        if !summary.all_scored {
            return Err(LifecycleError::IncompleteScores {
                scored: summary.scored_criteria,
                total: summary.total_criteria,
            }
            .into());
        }

        record.status = AssessmentStatus::Submitted;
        record.updated_at = Utc::now();
        self.repository.update(record.clone())?;

        self.audit.record(
            AuditEvent::new(actor, "assessment_submitted", record.assessment_id.0.clone())
                .detail("weighted_total", format!("{:.2}", summary.weighted_total)),
        )?;

        Ok(record)
    }

    /// A reviewer claims a submitted assessment.
    pub fn start_review(
        &self,
        assessment_id: &AssessmentId,
        actor: &str,
    ) -> Result<AssessmentRecord, GzeroServiceError> {
        let mut record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;

        ensure_can_start_review(record.status)?;

        record.status = AssessmentStatus::UnderReview;
        record.updated_at = Utc::now();
        self.repository.update(record.clone())?;

        self.audit.record(AuditEvent::new(
            actor,
            "review_started",
            record.assessment_id.0.clone(),
        ))?;

        Ok(record)
    }

    /// Record the reviewer's chosen decision. The reviewer's call stands even
    /// when it differs from the classified band; both are audited. Conditions
    /// are only accepted alongside a conditional go.
    pub fn decide(
        &self,
        assessment_id: &AssessmentId,
        decision: Decision,
        conditions: Vec<ConditionItem>,
        actor: &str,
    ) -> Result<AssessmentRecord, GzeroServiceError> {
        let mut record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;

        ensure_can_decide(record.status)?;
        let next_status = status_for_decision(decision)?;
        if decision != Decision::ConditionalGo && !conditions.is_empty() {
            return Err(LifecycleError::UnexpectedConditions.into());
        }

        let summary = self.engine.evaluate(&record.scores);

        record.status = next_status;
        record.decision = decision;
        record.conditions = conditions;
        record.updated_at = Utc::now();
        self.repository.update(record.clone())?;

        self.audit.record(
            AuditEvent::new(actor, "decision_recorded", record.assessment_id.0.clone())
                .detail("decision", decision.label())
                .detail("classified", summary.decision.label())
                .detail("weighted_total", format!("{:.2}", summary.weighted_total))
                .detail("conditions", record.conditions.len().to_string()),
        )?;

        Ok(record)
    }

    /// Assessments awaiting review, for the approvals queue. Callers classify
    /// these with the canonical thresholds only.
    pub fn pending_queue(&self, limit: usize) -> Result<Vec<AssessmentRecord>, GzeroServiceError> {
        Ok(self.repository.pending(limit)?)
    }

    /// Stateless scoring for the live editor. Optional threshold overrides
    /// apply to this preview alone and never touch persisted state.
    pub fn preview(
        &self,
        entries: Vec<ScoreEntry>,
        thresholds: Option<DecisionThresholds>,
    ) -> Result<ScoreSummary, GzeroServiceError> {
        let mut scores = BTreeMap::new();
        for entry in entries {
            self.engine.catalog().validate_entry(&entry)?;
            scores.insert(entry.criterion_id.clone(), entry);
        }

        let summary = match thresholds {
            Some(overrides) => self.engine.evaluate_with(&scores, &overrides),
            None => self.engine.evaluate(&scores),
        };
        Ok(summary)
    }
}

impl<R, A> ActivityGatekeeper for GzeroAssessmentService<R, A>
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    fn activity_gate(&self, project_id: &ProjectId) -> Result<ActivityGate, RepositoryError> {
        let record = self.repository.fetch_by_project(project_id)?;
        Ok(activity_gate(record.as_ref(), &self.engine))
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum GzeroServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
