use super::domain::{Activity, ActivityId, Project, ProjectId, Stakeholder, StakeholderId};

pub use crate::workflows::gzero::repository::RepositoryError;

/// Storage abstraction over the pipeline registry. One trait covers the three
/// aggregates; they live and die together in this bounded context.
pub trait PipelineRepository: Send + Sync {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn project_by_code(&self, code: &str) -> Result<Option<Project>, RepositoryError>;
    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError>;

    fn insert_stakeholder(&self, stakeholder: Stakeholder) -> Result<Stakeholder, RepositoryError>;
    fn fetch_stakeholder(&self, id: &StakeholderId)
        -> Result<Option<Stakeholder>, RepositoryError>;
    fn stakeholder_by_name(&self, name: &str) -> Result<Option<Stakeholder>, RepositoryError>;
    fn list_stakeholders(&self) -> Result<Vec<Stakeholder>, RepositoryError>;

    fn insert_activity(&self, activity: Activity) -> Result<Activity, RepositoryError>;
    fn update_activity(&self, activity: Activity) -> Result<(), RepositoryError>;
    fn fetch_activity(&self, id: &ActivityId) -> Result<Option<Activity>, RepositoryError>;
    fn activities_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Activity>, RepositoryError>;
    fn list_activities(&self) -> Result<Vec<Activity>, RepositoryError>;
}
