use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::audit::{AuditError, AuditEvent, AuditSink};
use crate::auth::{AuthContext, Role, Session, SessionError, SessionStore, SessionToken, UserId};
use crate::workflows::gzero::catalog::CriterionCatalog;
use crate::workflows::gzero::domain::{AssessmentId, ProjectId, ScoreEntry};
use crate::workflows::gzero::evaluation::{DecisionThresholds, ScoringEngine};
use crate::workflows::gzero::repository::{
    AssessmentRecord, AssessmentRepository, RepositoryError,
};
use crate::workflows::gzero::service::GzeroAssessmentService;

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::standard(DecisionThresholds::default())
}

pub(super) fn entry(criterion_id: &str, score: u8) -> ScoreEntry {
    ScoreEntry {
        criterion_id: criterion_id.to_string(),
        score,
        comment: String::new(),
    }
}

/// Every criterion scored at the same value. 1 and 3 are valid for both the
/// graded and binary sets.
pub(super) fn uniform_scores(score: u8) -> Vec<ScoreEntry> {
    CriterionCatalog::standard()
        .criteria()
        .iter()
        .map(|criterion| entry(criterion.key, score))
        .collect()
}

/// Fully scored set whose weighted total lands exactly on the conditional
/// threshold (1.80): five criteria raised from the all-ones floor.
pub(super) fn scores_at_conditional_threshold() -> Vec<ScoreEntry> {
    scores_with_overrides(&[
        ("strategic_fit", 3),
        ("account_growth", 3),
        ("client_relationship", 3),
        ("budget_confirmed", 3),
        ("payment_risk", 3),
    ])
}

/// Fully scored set with weighted total 1.79, one notch under the threshold.
pub(super) fn scores_just_under_threshold() -> Vec<ScoreEntry> {
    scores_with_overrides(&[
        ("strategic_fit", 3),
        ("account_growth", 3),
        ("client_relationship", 3),
        ("budget_confirmed", 3),
        ("domain_expertise", 2),
    ])
}

fn scores_with_overrides(overrides: &[(&str, u8)]) -> Vec<ScoreEntry> {
    let mut entries = uniform_scores(1);
    for (key, score) in overrides {
        if let Some(existing) = entries
            .iter_mut()
            .find(|entry| entry.criterion_id == *key)
        {
            existing.score = *score;
        }
    }
    entries
}

pub(super) fn build_service() -> (
    GzeroAssessmentService<MemoryAssessments, MemoryAudit>,
    Arc<MemoryAssessments>,
    Arc<MemoryAudit>,
) {
    let repository = Arc::new(MemoryAssessments::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = GzeroAssessmentService::new(repository.clone(), audit.clone(), engine());
    (service, repository, audit)
}

pub(super) fn project(id: &str) -> ProjectId {
    ProjectId(id.to_string())
}

/// Draft a fully scored assessment and return its id.
pub(super) fn scored_assessment(
    service: &GzeroAssessmentService<MemoryAssessments, MemoryAudit>,
    project_id: &ProjectId,
    entries: Vec<ScoreEntry>,
) -> AssessmentId {
    let record = service
        .assessment_for_project(project_id, "taylor")
        .expect("assessment created");
    service
        .save_scores(&record.assessment_id, entries, false, "taylor")
        .expect("scores saved");
    record.assessment_id
}

#[derive(Default, Clone)]
pub(super) struct MemoryAssessments {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for MemoryAssessments {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.assessment_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.assessment_id) {
            guard.insert(record.assessment_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.project_id == *project_id)
            .cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        use crate::workflows::gzero::domain::AssessmentStatus;
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| {
                matches!(
                    record.status,
                    AssessmentStatus::Submitted | AssessmentStatus::UnderReview
                )
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAudit {
    pub(super) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .expect("audit mutex poisoned")
            .push(event);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    sessions: Arc<Mutex<HashMap<SessionToken, Session>>>,
}

impl SessionStore for MemorySessions {
    fn insert(&self, session: Session) -> Result<(), SessionError> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(session.token.clone(), session);
        Ok(())
    }

    fn resolve(&self, token: &SessionToken) -> Result<Option<Session>, SessionError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(token).cloned())
    }

    fn revoke(&self, token: &SessionToken) -> Result<bool, SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.remove(token).is_some())
    }

    fn revoke_user(&self, user_id: &UserId) -> Result<usize, SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let before = guard.len();
        guard.retain(|_, session| session.user_id != *user_id);
        Ok(before - guard.len())
    }
}

/// Auth context with one pre-seeded session per role; returns the context and
/// the tokens for (manager, c-level, contributor).
pub(super) fn seeded_auth() -> (AuthContext, String, String, String) {
    let sessions = Arc::new(MemorySessions::default());
    let manager = seed_session(&sessions, "taylor", Role::Manager);
    let clevel = seed_session(&sessions, "morgan", Role::CLevel);
    let contributor = seed_session(&sessions, "riley", Role::Contributor);
    (AuthContext::new(sessions), manager, clevel, contributor)
}

fn seed_session(sessions: &Arc<MemorySessions>, username: &str, role: Role) -> String {
    let token = SessionToken(format!("test-{username}"));
    sessions
        .insert(Session {
            token: token.clone(),
            user_id: UserId(format!("usr-{username}")),
            username: username.to_string(),
            role,
            issued_at: Utc::now(),
        })
        .expect("session stored");
    token.0
}
