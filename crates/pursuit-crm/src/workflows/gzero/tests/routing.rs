use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Extension;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::gzero::router::assessment_router;

fn build_router() -> (axum::Router, String, String, String) {
    let (service, _, _) = build_service();
    let (context, manager, clevel, contributor) = seeded_auth();
    let router = assessment_router(Arc::new(service)).layer(Extension(context));
    (router, manager, clevel, contributor)
}

async fn read_json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

async fn send(
    router: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).expect("serialize")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router dispatch")
}

fn scores_payload(entries: &[(&str, u8)]) -> Value {
    let scores: Vec<Value> = entries
        .iter()
        .map(|(criterion, score)| json!({ "criterion_id": criterion, "score": score }))
        .collect();
    json!({ "scores": scores })
}

fn full_scores_payload() -> Value {
    let entries: Vec<(String, u8)> = uniform_scores(3)
        .into_iter()
        .map(|entry| (entry.criterion_id, entry.score))
        .collect();
    let scores: Vec<Value> = entries
        .iter()
        .map(|(criterion, score)| json!({ "criterion_id": criterion, "score": score }))
        .collect();
    json!({ "scores": scores })
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let (router, _, _, _) = build_router();

    let response = send(&router, "GET", "/api/v1/assessments/catalog", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("bearer token"));
}

#[tokio::test]
async fn unknown_tokens_are_unauthorized() {
    let (router, _, _, _) = build_router();

    let response = send(
        &router,
        "GET",
        "/api/v1/assessments/catalog",
        Some("test-nobody"),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn contributors_may_not_read_the_pending_queue() {
    let (router, _, _, contributor) = build_router();

    let response = send(
        &router,
        "GET",
        "/api/v1/assessments/pending",
        Some(&contributor),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn first_visit_returns_a_draft_assessment() {
    let (router, manager, _, _) = build_router();

    let response = send(
        &router,
        "GET",
        "/api/v1/projects/prj-route-1/assessment",
        Some(&manager),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("draft")));
    assert_eq!(payload.get("decision"), Some(&json!("pending")));
    assert_eq!(payload.get("all_scored"), Some(&json!(false)));
}

#[tokio::test]
async fn full_workflow_over_http_reaches_an_approval() {
    let (router, manager, clevel, _) = build_router();

    let draft = read_json_body(
        send(
            &router,
            "GET",
            "/api/v1/projects/prj-route-2/assessment",
            Some(&manager),
            None,
        )
        .await,
    )
    .await;
    let assessment_id = draft
        .get("assessment_id")
        .and_then(Value::as_str)
        .expect("assessment id")
        .to_string();

    let saved = send(
        &router,
        "PUT",
        &format!("/api/v1/assessments/{assessment_id}/scores"),
        Some(&manager),
        Some(full_scores_payload()),
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);
    let saved = read_json_body(saved).await;
    assert_eq!(saved.get("all_scored"), Some(&json!(true)));
    assert_eq!(saved.get("classified"), Some(&json!("go")));

    let submitted = send(
        &router,
        "POST",
        &format!("/api/v1/assessments/{assessment_id}/submit"),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(submitted.status(), StatusCode::OK);

    let queue = read_json_body(
        send(
            &router,
            "GET",
            "/api/v1/assessments/pending",
            Some(&clevel),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(queue.as_array().map(Vec::len), Some(1));

    let decided = send(
        &router,
        "POST",
        &format!("/api/v1/assessments/{assessment_id}/decision"),
        Some(&clevel),
        Some(json!({ "decision": "go" })),
    )
    .await;
    assert_eq!(decided.status(), StatusCode::OK);
    let decided = read_json_body(decided).await;
    assert_eq!(decided.get("status"), Some(&json!("approved")));
    assert_eq!(decided.get("decision"), Some(&json!("go")));
}

#[tokio::test]
async fn submitting_a_partial_assessment_is_unprocessable() {
    let (router, manager, _, _) = build_router();

    let draft = read_json_body(
        send(
            &router,
            "GET",
            "/api/v1/projects/prj-route-3/assessment",
            Some(&manager),
            None,
        )
        .await,
    )
    .await;
    let assessment_id = draft
        .get("assessment_id")
        .and_then(Value::as_str)
        .expect("assessment id")
        .to_string();

    send(
        &router,
        "PUT",
        &format!("/api/v1/assessments/{assessment_id}/scores"),
        Some(&manager),
        Some(scores_payload(&[
            ("strategic_fit", 3),
            ("client_relationship", 3),
            ("deal_size", 3),
        ])),
    )
    .await;

    let response = send(
        &router,
        "POST",
        &format!("/api/v1/assessments/{assessment_id}/submit"),
        Some(&manager),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("3 of 14"));
}

#[tokio::test]
async fn preview_applies_caller_thresholds_without_persisting() {
    let (router, manager, _, _) = build_router();

    let mut payload = full_scores_payload();
    payload["go_threshold"] = json!(3.5);
    payload["conditional_threshold"] = json!(3.2);

    let response = send(
        &router,
        "POST",
        "/api/v1/assessments/preview",
        Some(&manager),
        Some(payload),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body.get("decision"), Some(&json!("no_go")));
    assert!((body["weighted_total"].as_f64().expect("total") - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn catalog_endpoint_reports_weights() {
    let (router, manager, _, _) = build_router();

    let response = send(
        &router,
        "GET",
        "/api/v1/assessments/catalog",
        Some(&manager),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("criteria").and_then(Value::as_array).map(Vec::len),
        Some(14)
    );
    assert!((payload["weight_total"].as_f64().expect("total") - 100.0).abs() < 1e-9);
    assert!(payload.get("weight_warning").is_none());
}

#[tokio::test]
async fn decision_on_missing_assessment_is_not_found() {
    let (router, _, clevel, _) = build_router();

    let response = send(
        &router,
        "POST",
        "/api/v1/assessments/g0-999999/decision",
        Some(&clevel),
        Some(json!({ "decision": "no_go" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
