//! Pipeline registry: projects, stakeholders, pursuit activities with their
//! append-only comment logs, portfolio import, search, and analytics.

pub mod domain;
pub mod import;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Activity, ActivityId, ActivityKind, CommentEntry, CommentLog, Project, ProjectId, Stakeholder,
    StakeholderId, StakeholderKind,
};
pub use import::{PortfolioImportError, PortfolioImporter, PortfolioRow};
pub use report::PortfolioReport;
pub use repository::{PipelineRepository, RepositoryError};
pub use router::pipeline_router;
pub use service::{
    ImportSummary, NewActivity, NewProject, NewStakeholder, PipelineService, PipelineServiceError,
    SearchResults,
};
