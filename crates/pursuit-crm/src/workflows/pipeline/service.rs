use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::audit::{AuditError, AuditEvent, AuditSink};
use crate::workflows::gzero::gate::{ActivityGate, ActivityGatekeeper};

use super::domain::{
    Activity, ActivityId, ActivityKind, CommentEntry, CommentLog, Project, ProjectId, Stakeholder,
    StakeholderId, StakeholderKind,
};
use super::import::PortfolioRow;
use super::repository::{PipelineRepository, RepositoryError};

/// Service composing the registry repository, the assessment gatekeeper, and
/// the audit trail.
pub struct PipelineService<R, G, A> {
    repository: Arc<R>,
    gatekeeper: Arc<G>,
    audit: Arc<A>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub code: String,
    pub name: String,
    pub client: Option<StakeholderId>,
    pub owner: String,
}

#[derive(Debug, Clone)]
pub struct NewStakeholder {
    pub name: String,
    pub kind: StakeholderKind,
    pub contact: String,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub name: String,
    pub kind: ActivityKind,
}

/// Cross-entity match set for the global search endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub projects: Vec<Project>,
    pub stakeholders: Vec<Stakeholder>,
    pub activities: Vec<Activity>,
}

/// Outcome of a portfolio CSV import.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ImportSummary {
    pub projects_created: usize,
    pub stakeholders_created: usize,
    pub skipped: usize,
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static STAKEHOLDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ACTIVITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    let id = PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProjectId(format!("prj-{id:06}"))
}

fn next_stakeholder_id() -> StakeholderId {
    let id = STAKEHOLDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    StakeholderId(format!("stk-{id:06}"))
}

fn next_activity_id() -> ActivityId {
    let id = ACTIVITY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ActivityId(format!("act-{id:06}"))
}

impl<R, G, A> PipelineService<R, G, A>
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    pub fn new(repository: Arc<R>, gatekeeper: Arc<G>, audit: Arc<A>) -> Self {
        Self {
            repository,
            gatekeeper,
            audit,
        }
    }

    pub fn create_project(
        &self,
        request: NewProject,
        actor: &str,
    ) -> Result<Project, PipelineServiceError> {
        let code = request.code.trim().to_string();
        if code.is_empty() {
            return Err(PipelineServiceError::EmptyProjectCode);
        }
        if self.repository.project_by_code(&code)?.is_some() {
            return Err(PipelineServiceError::DuplicateCode(code));
        }
        if let Some(client) = &request.client {
            if self.repository.fetch_stakeholder(client)?.is_none() {
                return Err(PipelineServiceError::UnknownStakeholder(client.0.clone()));
            }
        }

        let project = Project {
            project_id: next_project_id(),
            code,
            name: request.name,
            client: request.client,
            owner: request.owner,
            created_at: Utc::now(),
        };
        let stored = self.repository.insert_project(project)?;

        self.audit.record(
            AuditEvent::new(actor, "project_created", stored.project_id.0.clone())
                .detail("code", stored.code.clone()),
        )?;

        Ok(stored)
    }

    pub fn register_stakeholder(
        &self,
        request: NewStakeholder,
        actor: &str,
    ) -> Result<Stakeholder, PipelineServiceError> {
        let stakeholder = Stakeholder {
            stakeholder_id: next_stakeholder_id(),
            name: request.name,
            kind: request.kind,
            contact: request.contact,
            created_at: Utc::now(),
        };
        let stored = self.repository.insert_stakeholder(stakeholder)?;

        self.audit.record(
            AuditEvent::new(actor, "stakeholder_registered", stored.stakeholder_id.0.clone())
                .detail("kind", stored.kind.label()),
        )?;

        Ok(stored)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, PipelineServiceError> {
        Ok(self.repository.list_projects()?)
    }

    pub fn list_stakeholders(&self) -> Result<Vec<Stakeholder>, PipelineServiceError> {
        Ok(self.repository.list_stakeholders()?)
    }

    /// Project plus its current activity gate, for detail views that render
    /// the block reason.
    pub fn project_detail(
        &self,
        project_id: &ProjectId,
    ) -> Result<(Project, ActivityGate), PipelineServiceError> {
        let project = self
            .repository
            .fetch_project(project_id)?
            .ok_or_else(|| PipelineServiceError::UnknownProject(project_id.0.clone()))?;
        let gate = self.gatekeeper.activity_gate(project_id)?;
        Ok((project, gate))
    }

    /// Create an activity under a project. Runs the assessment gate first and
    /// refuses with its reason when blocked, whatever the approval status.
    pub fn create_activity(
        &self,
        project_id: &ProjectId,
        request: NewActivity,
        actor: &str,
    ) -> Result<Activity, PipelineServiceError> {
        if self.repository.fetch_project(project_id)?.is_none() {
            return Err(PipelineServiceError::UnknownProject(project_id.0.clone()));
        }

        let gate = self.gatekeeper.activity_gate(project_id)?;
        if !gate.allowed {
            return Err(PipelineServiceError::ActivityBlocked {
                reason: gate.reason,
            });
        }

        let now = Utc::now();
        let mut comments = CommentLog::default();
        comments.append(
            "workflow",
            format!("activity created by {actor}"),
            true,
            now,
        );

        let activity = Activity {
            activity_id: next_activity_id(),
            project_id: project_id.clone(),
            name: request.name,
            kind: request.kind,
            owner: actor.to_string(),
            created_at: now,
            comments,
        };
        let stored = self.repository.insert_activity(activity)?;

        self.audit.record(
            AuditEvent::new(actor, "activity_created", stored.activity_id.0.clone())
                .detail("project_id", stored.project_id.0.clone())
                .detail("kind", stored.kind.label()),
        )?;

        Ok(stored)
    }

    pub fn activities_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Activity>, PipelineServiceError> {
        if self.repository.fetch_project(project_id)?.is_none() {
            return Err(PipelineServiceError::UnknownProject(project_id.0.clone()));
        }
        Ok(self.repository.activities_for_project(project_id)?)
    }

    /// Append a user comment to an activity's log.
    pub fn add_comment(
        &self,
        activity_id: &ActivityId,
        author: &str,
        body: &str,
    ) -> Result<CommentEntry, PipelineServiceError> {
        if body.trim().is_empty() {
            return Err(PipelineServiceError::EmptyComment);
        }

        let mut activity = self
            .repository
            .fetch_activity(activity_id)?
            .ok_or_else(|| PipelineServiceError::UnknownActivity(activity_id.0.clone()))?;

        let entry = activity
            .comments
            .append(author, body.trim(), false, Utc::now())
            .clone();
        self.repository.update_activity(activity)?;

        self.audit.record(
            AuditEvent::new(author, "comment_added", activity_id.0.clone())
                .detail("seq", entry.seq.to_string()),
        )?;

        Ok(entry)
    }

    pub fn comments(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Vec<CommentEntry>, PipelineServiceError> {
        let activity = self
            .repository
            .fetch_activity(activity_id)?
            .ok_or_else(|| PipelineServiceError::UnknownActivity(activity_id.0.clone()))?;
        Ok(activity.comments.entries().to_vec())
    }

    /// Case-insensitive substring search across the registry. An empty query
    /// matches nothing.
    pub fn search(&self, query: &str) -> Result<SearchResults, PipelineServiceError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchResults {
                projects: Vec::new(),
                stakeholders: Vec::new(),
                activities: Vec::new(),
            });
        }

        let projects = self
            .repository
            .list_projects()?
            .into_iter()
            .filter(|project| {
                project.code.to_lowercase().contains(&needle)
                    || project.name.to_lowercase().contains(&needle)
            })
            .collect();
        let stakeholders = self
            .repository
            .list_stakeholders()?
            .into_iter()
            .filter(|stakeholder| stakeholder.name.to_lowercase().contains(&needle))
            .collect();
        let activities = self
            .repository
            .list_activities()?
            .into_iter()
            .filter(|activity| activity.name.to_lowercase().contains(&needle))
            .collect();

        Ok(SearchResults {
            projects,
            stakeholders,
            activities,
        })
    }

    /// Hydrate the registry from a portfolio export. Stakeholders are deduped
    /// by name, projects by code; duplicates are counted, not errors.
    pub fn import_portfolio(
        &self,
        rows: Vec<PortfolioRow>,
        actor: &str,
    ) -> Result<ImportSummary, PipelineServiceError> {
        let mut summary = ImportSummary::default();

        for row in rows {
            if self.repository.project_by_code(&row.code)?.is_some() {
                summary.skipped += 1;
                continue;
            }

            let client = match &row.client {
                Some(name) => match self.repository.stakeholder_by_name(name)? {
                    Some(existing) => Some(existing.stakeholder_id),
                    None => {
                        let stakeholder = self.register_stakeholder(
                            NewStakeholder {
                                name: name.clone(),
                                kind: row.client_kind,
                                contact: String::new(),
                            },
                            actor,
                        )?;
                        summary.stakeholders_created += 1;
                        Some(stakeholder.stakeholder_id)
                    }
                },
                None => None,
            };

            self.create_project(
                NewProject {
                    code: row.code,
                    name: row.name,
                    client,
                    owner: row.owner,
                },
                actor,
            )?;
            summary.projects_created += 1;
        }

        self.audit.record(
            AuditEvent::new(actor, "portfolio_imported", "pipeline")
                .detail("projects_created", summary.projects_created.to_string())
                .detail("skipped", summary.skipped.to_string()),
        )?;

        Ok(summary)
    }
}

/// Error raised by the pipeline service.
#[derive(Debug, thiserror::Error)]
pub enum PipelineServiceError {
    #[error("project code must not be empty")]
    EmptyProjectCode,
    #[error("project code '{0}' is already in use")]
    DuplicateCode(String),
    #[error("stakeholder '{0}' is not registered")]
    UnknownStakeholder(String),
    #[error("project '{0}' is not registered")]
    UnknownProject(String),
    #[error("activity '{0}' is not registered")]
    UnknownActivity(String),
    #[error("activity creation blocked: {reason}")]
    ActivityBlocked { reason: String },
    #[error("comment body must not be empty")]
    EmptyComment,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
