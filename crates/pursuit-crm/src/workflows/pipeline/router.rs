use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit::AuditSink;
use crate::auth::{Authenticated, Capability};
use crate::workflows::gzero::gate::{ActivityGate, ActivityGatekeeper};

use super::domain::{ActivityId, ActivityKind, Project, ProjectId, StakeholderId, StakeholderKind};
use super::repository::{PipelineRepository, RepositoryError};
use super::service::{
    NewActivity, NewProject, NewStakeholder, PipelineService, PipelineServiceError,
};

/// Router builder exposing the pipeline registry endpoints.
pub fn pipeline_router<R, G, A>(service: Arc<PipelineService<R, G, A>>) -> Router
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects",
            post(create_project_handler::<R, G, A>).get(list_projects_handler::<R, G, A>),
        )
        .route(
            "/api/v1/projects/:project_id",
            get(project_detail_handler::<R, G, A>),
        )
        .route(
            "/api/v1/projects/:project_id/activities",
            post(create_activity_handler::<R, G, A>).get(list_activities_handler::<R, G, A>),
        )
        .route(
            "/api/v1/stakeholders",
            post(create_stakeholder_handler::<R, G, A>).get(list_stakeholders_handler::<R, G, A>),
        )
        .route(
            "/api/v1/activities/:activity_id/comments",
            post(add_comment_handler::<R, G, A>).get(list_comments_handler::<R, G, A>),
        )
        .route("/api/v1/search/:query", get(search_handler::<R, G, A>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewProjectRequest {
    code: String,
    name: String,
    #[serde(default)]
    client: Option<String>,
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewStakeholderRequest {
    name: String,
    kind: StakeholderKind,
    #[serde(default)]
    contact: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewActivityRequest {
    name: String,
    kind: ActivityKind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewCommentRequest {
    body: String,
}

/// Project detail payload: the record plus its live activity gate.
#[derive(Debug, Serialize)]
pub(crate) struct ProjectDetailView {
    #[serde(flatten)]
    project: Project,
    gate: ActivityGate,
}

pub(crate) async fn create_project_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    user: Authenticated,
    axum::Json(request): axum::Json<NewProjectRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ManagePipeline) {
        return rejection.into_response();
    }

    let owner = request
        .owner
        .unwrap_or_else(|| user.actor().to_string());
    let new_project = NewProject {
        code: request.code,
        name: request.name,
        client: request.client.map(StakeholderId),
        owner,
    };

    match service.create_project(new_project, user.actor()) {
        Ok(project) => (StatusCode::CREATED, axum::Json(project)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_projects_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    _user: Authenticated,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    match service.list_projects() {
        Ok(projects) => (StatusCode::OK, axum::Json(projects)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn project_detail_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    _user: Authenticated,
    Path(project_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    match service.project_detail(&ProjectId(project_id)) {
        Ok((project, gate)) => {
            let view = ProjectDetailView { project, gate };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_stakeholder_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    user: Authenticated,
    axum::Json(request): axum::Json<NewStakeholderRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ManagePipeline) {
        return rejection.into_response();
    }

    let new_stakeholder = NewStakeholder {
        name: request.name,
        kind: request.kind,
        contact: request.contact,
    };

    match service.register_stakeholder(new_stakeholder, user.actor()) {
        Ok(stakeholder) => (StatusCode::CREATED, axum::Json(stakeholder)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_stakeholders_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    _user: Authenticated,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    match service.list_stakeholders() {
        Ok(stakeholders) => (StatusCode::OK, axum::Json(stakeholders)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_activity_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    user: Authenticated,
    Path(project_id): Path<String>,
    axum::Json(request): axum::Json<NewActivityRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ManagePipeline) {
        return rejection.into_response();
    }

    let new_activity = NewActivity {
        name: request.name,
        kind: request.kind,
    };

    match service.create_activity(&ProjectId(project_id), new_activity, user.actor()) {
        Ok(activity) => (StatusCode::CREATED, axum::Json(activity)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_activities_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    _user: Authenticated,
    Path(project_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    match service.activities_for_project(&ProjectId(project_id)) {
        Ok(activities) => (StatusCode::OK, axum::Json(activities)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn add_comment_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    user: Authenticated,
    Path(activity_id): Path<String>,
    axum::Json(request): axum::Json<NewCommentRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    match service.add_comment(&ActivityId(activity_id), user.actor(), &request.body) {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_comments_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    _user: Authenticated,
    Path(activity_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    match service.comments(&ActivityId(activity_id)) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn search_handler<R, G, A>(
    State(service): State<Arc<PipelineService<R, G, A>>>,
    _user: Authenticated,
    Path(query): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    G: ActivityGatekeeper + 'static,
    A: AuditSink + 'static,
{
    match service.search(&query) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => service_error_response(error),
    }
}

fn service_error_response(error: PipelineServiceError) -> Response {
    let status = match &error {
        PipelineServiceError::DuplicateCode(_) => StatusCode::CONFLICT,
        PipelineServiceError::UnknownProject(_) | PipelineServiceError::UnknownActivity(_) => {
            StatusCode::NOT_FOUND
        }
        PipelineServiceError::EmptyProjectCode
        | PipelineServiceError::UnknownStakeholder(_)
        | PipelineServiceError::ActivityBlocked { .. }
        | PipelineServiceError::EmptyComment => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PipelineServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PipelineServiceError::Repository(RepositoryError::Unavailable(_))
        | PipelineServiceError::Audit(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
