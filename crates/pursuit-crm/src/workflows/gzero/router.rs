use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::audit::AuditSink;
use crate::auth::{Authenticated, Capability};

use super::domain::{
    AssessmentId, ConditionItem, ConditionStatus, Decision, ProjectId, ScoreEntry,
};
use super::evaluation::DecisionThresholds;
use super::lifecycle::LifecycleError;
use super::repository::{AssessmentRepository, AssessmentView, RepositoryError};
use super::service::{GzeroAssessmentService, GzeroServiceError};

const PENDING_QUEUE_LIMIT: usize = 50;

/// Router builder exposing the assessment workflow endpoints.
pub fn assessment_router<R, A>(service: Arc<GzeroAssessmentService<R, A>>) -> Router
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects/:project_id/assessment",
            get(project_assessment_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/scores",
            put(save_scores_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submit",
            post(submit_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/review",
            post(start_review_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/decision",
            post(decision_handler::<R, A>),
        )
        .route("/api/v1/assessments/pending", get(pending_handler::<R, A>))
        .route("/api/v1/assessments/preview", post(preview_handler::<R, A>))
        .route("/api/v1/assessments/catalog", get(catalog_handler::<R, A>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreEntryPayload {
    criterion_id: String,
    score: u8,
    #[serde(default)]
    comment: String,
}

impl ScoreEntryPayload {
    fn into_entry(self) -> ScoreEntry {
        ScoreEntry {
            criterion_id: self.criterion_id,
            score: self.score,
            comment: self.comment,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveScoresRequest {
    scores: Vec<ScoreEntryPayload>,
    #[serde(default)]
    revert_to_draft: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionPayload {
    condition: String,
    #[serde(default)]
    responsible_id: Option<String>,
    due_date: NaiveDate,
    #[serde(default)]
    notes: String,
}

impl ConditionPayload {
    fn into_item(self) -> ConditionItem {
        ConditionItem {
            condition: self.condition,
            responsible_id: self.responsible_id,
            due_date: self.due_date,
            notes: self.notes,
            status: ConditionStatus::Pending,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    decision: Decision,
    #[serde(default)]
    conditions: Vec<ConditionPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewRequest {
    scores: Vec<ScoreEntryPayload>,
    #[serde(default)]
    go_threshold: Option<f64>,
    #[serde(default)]
    conditional_threshold: Option<f64>,
}

pub(crate) async fn project_assessment_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    user: Authenticated,
    Path(project_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    let project_id = ProjectId(project_id);
    match service.assessment_for_project(&project_id, user.actor()) {
        Ok(record) => view_response(StatusCode::OK, &service, record),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn save_scores_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    user: Authenticated,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<SaveScoresRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::EditScores) {
        return rejection.into_response();
    }

    let id = AssessmentId(assessment_id);
    let entries = request
        .scores
        .into_iter()
        .map(ScoreEntryPayload::into_entry)
        .collect();

    match service.save_scores(&id, entries, request.revert_to_draft, user.actor()) {
        Ok(record) => view_response(StatusCode::OK, &service, record),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn submit_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    user: Authenticated,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::SubmitAssessment) {
        return rejection.into_response();
    }

    let id = AssessmentId(assessment_id);
    match service.submit(&id, user.actor()) {
        Ok(record) => view_response(StatusCode::OK, &service, record),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn start_review_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    user: Authenticated,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ApproveAssessment) {
        return rejection.into_response();
    }

    let id = AssessmentId(assessment_id);
    match service.start_review(&id, user.actor()) {
        Ok(record) => view_response(StatusCode::OK, &service, record),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn decision_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    user: Authenticated,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ApproveAssessment) {
        return rejection.into_response();
    }

    let id = AssessmentId(assessment_id);
    let conditions = request
        .conditions
        .into_iter()
        .map(ConditionPayload::into_item)
        .collect();

    match service.decide(&id, request.decision, conditions, user.actor()) {
        Ok(record) => view_response(StatusCode::OK, &service, record),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn pending_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    user: Authenticated,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ApproveAssessment) {
        return rejection.into_response();
    }

    match service.pending_queue(PENDING_QUEUE_LIMIT) {
        Ok(records) => {
            let views: Vec<AssessmentView> = records
                .into_iter()
                .map(|record| {
                    let summary = service.summarize(&record);
                    record.view(summary)
                })
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn preview_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    _user: Authenticated,
    axum::Json(request): axum::Json<PreviewRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    let overrides = match (request.go_threshold, request.conditional_threshold) {
        (None, None) => None,
        (go, conditional) => {
            let defaults = *service.engine().thresholds();
            Some(DecisionThresholds::new(
                go.unwrap_or(defaults.go),
                conditional.unwrap_or(defaults.conditional),
            ))
        }
    };

    let entries = request
        .scores
        .into_iter()
        .map(ScoreEntryPayload::into_entry)
        .collect();

    match service.preview(entries, overrides) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn catalog_handler<R, A>(
    State(service): State<Arc<GzeroAssessmentService<R, A>>>,
    _user: Authenticated,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    let view = service.engine().catalog().view();
    (StatusCode::OK, axum::Json(view)).into_response()
}

fn view_response<R, A>(
    status: StatusCode,
    service: &GzeroAssessmentService<R, A>,
    record: super::repository::AssessmentRecord,
) -> Response
where
    R: AssessmentRepository + 'static,
    A: AuditSink + 'static,
{
    let summary = service.summarize(&record);
    (status, axum::Json(record.view(summary))).into_response()
}

fn service_error_response(error: GzeroServiceError) -> Response {
    let status = match &error {
        GzeroServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        GzeroServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        GzeroServiceError::Lifecycle(LifecycleError::IllegalTransition { .. }) => {
            StatusCode::CONFLICT
        }
        GzeroServiceError::Lifecycle(_) | GzeroServiceError::Score(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GzeroServiceError::Repository(RepositoryError::Unavailable(_))
        | GzeroServiceError::Audit(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
