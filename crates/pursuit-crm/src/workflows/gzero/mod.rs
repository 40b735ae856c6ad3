//! The G0 go/no-go opportunity assessment workflow: criterion catalog,
//! weighted scoring, decision classification, lifecycle transitions, and the
//! downstream activity gate.

pub mod catalog;
pub mod domain;
mod evaluation;
pub mod gate;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    CatalogView, Criterion, CriterionCatalog, CriterionCategory, CriterionView, ScoreError,
};
pub use domain::{
    AssessmentId, AssessmentStatus, ConditionItem, ConditionStatus, Decision, ProjectId,
    ScoreEntry,
};
pub use evaluation::{CriterionContribution, DecisionThresholds, ScoreSummary, ScoringEngine};
pub use gate::{activity_gate, ActivityGate, ActivityGatekeeper};
pub use lifecycle::LifecycleError;
pub use repository::{AssessmentRecord, AssessmentRepository, AssessmentView, RepositoryError};
pub use router::assessment_router;
pub use service::{GzeroAssessmentService, GzeroServiceError};
