use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use pursuit_crm::audit::{AuditError, AuditEvent, AuditSink};
use pursuit_crm::auth::{
    AccessService, DirectoryError, Role, Session, SessionError, SessionStore, SessionToken,
    UserAccount, UserDirectory, UserId,
};
use pursuit_crm::config::AppConfig;
use pursuit_crm::workflows::gzero::{
    AssessmentId, AssessmentRecord, AssessmentRepository, AssessmentStatus, DecisionThresholds,
    GzeroAssessmentService, ProjectId, RepositoryError, ScoringEngine,
};
use pursuit_crm::workflows::pipeline::{
    Activity, ActivityId, PipelineRepository, PipelineService, Project, Stakeholder, StakeholderId,
};

pub(crate) type Gzero = GzeroAssessmentService<InMemoryAssessmentRepository, InMemoryAuditLog>;
pub(crate) type Pipeline =
    PipelineService<InMemoryPipelineRepository, Gzero, InMemoryAuditLog>;
pub(crate) type Access =
    AccessService<InMemoryUserDirectory, InMemorySessionStore, InMemoryAuditLog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Concrete repository handles for endpoints that aggregate across domains
/// (analytics, audit trail).
#[derive(Clone)]
pub(crate) struct DomainHandles {
    pub(crate) assessments: Arc<InMemoryAssessmentRepository>,
    pub(crate) registry: Arc<InMemoryPipelineRepository>,
    pub(crate) audit: Arc<InMemoryAuditLog>,
    pub(crate) engine: Arc<ScoringEngine>,
}

pub(crate) fn scoring_engine(config: &AppConfig) -> ScoringEngine {
    ScoringEngine::standard(DecisionThresholds::new(
        config.scoring.go_threshold,
        config.scoring.conditional_threshold,
    ))
}

/// Seed the bootstrap administrator. Idempotent: an existing admin account is
/// left untouched.
pub(crate) fn seed_admin(directory: &InMemoryUserDirectory, access_code: &str) {
    let account = UserAccount {
        user_id: UserId("usr-admin".to_string()),
        username: "admin".to_string(),
        display_name: "Platform Administrator".to_string(),
        role: Role::Admin,
        access_code: access_code.to_string(),
        active: true,
    };

    match directory.insert(account) {
        Ok(_) => tracing::info!("seeded bootstrap admin account"),
        Err(DirectoryError::Conflict) => {}
        Err(err) => tracing::warn!("could not seed admin account: {err}"),
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
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
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut pending: Vec<AssessmentRecord> = guard
            .values()
            .filter(|record| {
                matches!(
                    record.status,
                    AssessmentStatus::Submitted | AssessmentStatus::UnderReview
                )
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        pending.truncate(limit);
        Ok(pending)
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryPipelineRepository {
    projects: Mutex<HashMap<ProjectId, Project>>,
    stakeholders: Mutex<HashMap<StakeholderId, Stakeholder>>,
    activities: Mutex<HashMap<ActivityId, Activity>>,
}

impl PipelineRepository for InMemoryPipelineRepository {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.projects.lock().expect("project mutex poisoned");
        if guard.contains_key(&project.project_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.project_id.clone(), project.clone());
        Ok(project)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.projects.lock().expect("project mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn project_by_code(&self, code: &str) -> Result<Option<Project>, RepositoryError> {
        let guard = self.projects.lock().expect("project mutex poisoned");
        Ok(guard.values().find(|project| project.code == code).cloned())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.projects.lock().expect("project mutex poisoned");
        let mut projects: Vec<Project> = guard.values().cloned().collect();
        projects.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(projects)
    }

    fn insert_stakeholder(&self, stakeholder: Stakeholder) -> Result<Stakeholder, RepositoryError> {
        let mut guard = self.stakeholders.lock().expect("stakeholder mutex poisoned");
        if guard.contains_key(&stakeholder.stakeholder_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(stakeholder.stakeholder_id.clone(), stakeholder.clone());
        Ok(stakeholder)
    }

    fn fetch_stakeholder(
        &self,
        id: &StakeholderId,
    ) -> Result<Option<Stakeholder>, RepositoryError> {
        let guard = self.stakeholders.lock().expect("stakeholder mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn stakeholder_by_name(&self, name: &str) -> Result<Option<Stakeholder>, RepositoryError> {
        let guard = self.stakeholders.lock().expect("stakeholder mutex poisoned");
        Ok(guard
            .values()
            .find(|stakeholder| stakeholder.name == name)
            .cloned())
    }

    fn list_stakeholders(&self) -> Result<Vec<Stakeholder>, RepositoryError> {
        let guard = self.stakeholders.lock().expect("stakeholder mutex poisoned");
        let mut stakeholders: Vec<Stakeholder> = guard.values().cloned().collect();
        stakeholders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stakeholders)
    }

    fn insert_activity(&self, activity: Activity) -> Result<Activity, RepositoryError> {
        let mut guard = self.activities.lock().expect("activity mutex poisoned");
        if guard.contains_key(&activity.activity_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(activity.activity_id.clone(), activity.clone());
        Ok(activity)
    }

    fn update_activity(&self, activity: Activity) -> Result<(), RepositoryError> {
        let mut guard = self.activities.lock().expect("activity mutex poisoned");
        if guard.contains_key(&activity.activity_id) {
            guard.insert(activity.activity_id.clone(), activity);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_activity(&self, id: &ActivityId) -> Result<Option<Activity>, RepositoryError> {
        let guard = self.activities.lock().expect("activity mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn activities_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let guard = self.activities.lock().expect("activity mutex poisoned");
        let mut activities: Vec<Activity> = guard
            .values()
            .filter(|activity| activity.project_id == *project_id)
            .cloned()
            .collect();
        activities.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(activities)
    }

    fn list_activities(&self) -> Result<Vec<Activity>, RepositoryError> {
        let guard = self.activities.lock().expect("activity mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserDirectory {
    accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
}

impl UserDirectory for InMemoryUserDirectory {
    fn insert(&self, account: UserAccount) -> Result<UserAccount, DirectoryError> {
        let mut guard = self.accounts.lock().expect("directory mutex poisoned");
        let duplicate = guard.contains_key(&account.user_id)
            || guard.values().any(|existing| existing.username == account.username);
        if duplicate {
            return Err(DirectoryError::Conflict);
        }
        guard.insert(account.user_id.clone(), account.clone());
        Ok(account)
    }

    fn update(&self, account: UserAccount) -> Result<(), DirectoryError> {
        let mut guard = self.accounts.lock().expect("directory mutex poisoned");
        if guard.contains_key(&account.user_id) {
            guard.insert(account.user_id.clone(), account);
            Ok(())
        } else {
            Err(DirectoryError::NotFound)
        }
    }

    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_username(&self, username: &str) -> Result<Option<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    fn list(&self) -> Result<Vec<UserAccount>, DirectoryError> {
        let guard = self.accounts.lock().expect("directory mutex poisoned");
        let mut accounts: Vec<UserAccount> = guard.values().cloned().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionToken, Session>>>,
}

impl SessionStore for InMemorySessionStore {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditLog {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditLog {
    pub(crate) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .expect("audit mutex poisoned")
            .push(event);
        Ok(())
    }
}
