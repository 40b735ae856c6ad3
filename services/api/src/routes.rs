use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::json;

use pursuit_crm::auth::{
    auth_router, session_router, user_admin_router, AuthContext, Authenticated, Capability,
};
use pursuit_crm::workflows::gzero::{assessment_router, AssessmentRepository};
use pursuit_crm::workflows::pipeline::report::views::{PortfolioInsights, PortfolioSummary};
use pursuit_crm::workflows::pipeline::{pipeline_router, PipelineRepository, PortfolioReport};

use crate::infra::{Access, AppState, DomainHandles, Gzero, Pipeline};

const AUDIT_TRAIL_LIMIT: usize = 50;

/// Compose the full API surface: domain routers behind the bearer-token
/// extractor, the public login route, and the operational endpoints.
pub(crate) fn with_domain_routes(
    gzero: Arc<Gzero>,
    pipeline: Arc<Pipeline>,
    access: Arc<Access>,
    context: AuthContext,
    handles: DomainHandles,
) -> axum::Router {
    assessment_router(gzero)
        .merge(pipeline_router(pipeline))
        .merge(session_router(access.clone()))
        .merge(user_admin_router(access.clone()))
        .route("/api/v1/audit", axum::routing::get(audit_trail_endpoint))
        .route(
            "/api/v1/analytics/portfolio",
            axum::routing::get(portfolio_endpoint),
        )
        .layer(Extension(context))
        .layer(Extension(handles))
        .merge(auth_router(access))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Serialize)]
pub(crate) struct PortfolioResponse {
    pub(crate) summary: PortfolioSummary,
    pub(crate) insights: PortfolioInsights,
}

/// Dashboard aggregation: recomputes scoring and gating over repository
/// snapshots at request time.
pub(crate) async fn portfolio_endpoint(
    Extension(handles): Extension<DomainHandles>,
    user: Authenticated,
) -> Response {
    if let Err(rejection) = user.require(Capability::ViewAnalytics) {
        return rejection.into_response();
    }

    let snapshots = handles
        .registry
        .list_projects()
        .and_then(|projects| {
            let stakeholders = handles.registry.list_stakeholders()?;
            let activities = handles.registry.list_activities()?;
            let assessments = handles.assessments.all()?;
            Ok((projects, stakeholders, activities, assessments))
        });

    match snapshots {
        Ok((projects, stakeholders, activities, assessments)) => {
            let summary = PortfolioReport::build(
                &projects,
                &stakeholders,
                &activities,
                &assessments,
                &handles.engine,
            )
            .summary();
            let insights = summary.insights();
            (
                StatusCode::OK,
                Json(PortfolioResponse { summary, insights }),
            )
                .into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Most recent audit events, newest first.
pub(crate) async fn audit_trail_endpoint(
    Extension(handles): Extension<DomainHandles>,
    user: Authenticated,
) -> Response {
    if let Err(rejection) = user.require(Capability::ViewAudit) {
        return rejection.into_response();
    }

    let mut events = handles.audit.events();
    events.reverse();
    events.truncate(AUDIT_TRAIL_LIMIT);
    (StatusCode::OK, Json(events)).into_response()
}
