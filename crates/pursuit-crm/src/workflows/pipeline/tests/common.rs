use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::audit::{AuditError, AuditEvent, AuditSink};
use crate::workflows::gzero::gate::{ActivityGate, ActivityGatekeeper};
use crate::workflows::gzero::repository::RepositoryError;
use crate::workflows::pipeline::domain::{
    Activity, ActivityId, ActivityKind, Project, ProjectId, Stakeholder, StakeholderId,
    StakeholderKind,
};
use crate::workflows::pipeline::repository::PipelineRepository;
use crate::workflows::pipeline::service::{NewActivity, NewProject, NewStakeholder, PipelineService};

pub(super) fn new_project(code: &str, name: &str) -> NewProject {
    NewProject {
        code: code.to_string(),
        name: name.to_string(),
        client: None,
        owner: "taylor".to_string(),
    }
}

pub(super) fn new_stakeholder(name: &str) -> NewStakeholder {
    NewStakeholder {
        name: name.to_string(),
        kind: StakeholderKind::Client,
        contact: "bd@example.com".to_string(),
    }
}

pub(super) fn new_activity(name: &str) -> NewActivity {
    NewActivity {
        name: name.to_string(),
        kind: ActivityKind::Sales,
    }
}

/// Gatekeeper stub returning a fixed verdict, so registry tests do not need a
/// live assessment service.
pub(super) struct StaticGate {
    pub(super) allowed: bool,
    pub(super) reason: &'static str,
}

impl StaticGate {
    pub(super) fn open() -> Self {
        Self {
            allowed: true,
            reason: "weighted score clears the conditional threshold",
        }
    }

    pub(super) fn closed(reason: &'static str) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

impl ActivityGatekeeper for StaticGate {
    fn activity_gate(&self, _project_id: &ProjectId) -> Result<ActivityGate, RepositoryError> {
        Ok(ActivityGate {
            allowed: self.allowed,
            reason: self.reason.to_string(),
        })
    }
}

pub(super) fn build_service(
    gate: StaticGate,
) -> (
    PipelineService<MemoryPipeline, StaticGate, MemoryAudit>,
    Arc<MemoryPipeline>,
    Arc<MemoryAudit>,
) {
    let repository = Arc::new(MemoryPipeline::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = PipelineService::new(repository.clone(), Arc::new(gate), audit.clone());
    (service, repository, audit)
}

#[derive(Default)]
pub(super) struct MemoryPipeline {
    projects: Mutex<HashMap<ProjectId, Project>>,
    stakeholders: Mutex<HashMap<StakeholderId, Stakeholder>>,
    activities: Mutex<HashMap<ActivityId, Activity>>,
}

impl PipelineRepository for MemoryPipeline {
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
        Ok(guard.values().cloned().collect())
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
        Ok(guard.values().cloned().collect())
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
        Ok(guard
            .values()
            .filter(|activity| activity.project_id == *project_id)
            .cloned()
            .collect())
    }

    fn list_activities(&self) -> Result<Vec<Activity>, RepositoryError> {
        let guard = self.activities.lock().expect("activity mutex poisoned");
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
