use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::artist::domain::ApplicationDraft;
use crate::workflows::artist::{artist_router, ArtistApplicationService};

fn submit_body(draft: &ApplicationDraft) -> Body {
    let payload = json!({
        "artist_id": "artist-nova",
        "draft": draft,
    });
    Body::from(serde_json::to_vec(&payload).expect("serialize payload"))
}

fn review_body() -> Body {
    Body::from(
        serde_json::to_vec(&json!({
            "reviewer_id": "admin-iris",
            "reason": "Incomplete portfolio",
        }))
        .expect("serialize payload"),
    )
}

#[tokio::test]
async fn submit_route_accepts_complete_drafts() {
    let (service, _, _) = build_service();
    let router = artist_router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/artists/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .body(submit_body(&complete_draft()))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert!(payload.get("application_id").is_some());
    assert_eq!(payload.get("status"), Some(&json!("pending")));
    assert_eq!(payload.get("stage_name"), Some(&json!("Nova R")));
}

#[tokio::test]
async fn submit_route_lists_missing_fields() {
    let (service, _, _) = build_service();
    let router = artist_router_with_service(service);
    let mut draft = complete_draft();
    draft.identity.stage_name = String::new();

    let response = router
        .oneshot(
            Request::post("/api/v1/artists/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .body(submit_body(&draft))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("missing"), Some(&json!(["stageName"])));
}

#[tokio::test]
async fn submit_route_reports_repository_outages() {
    let service = Arc::new(ArtistApplicationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(RecordingNotifier::default()),
    ));
    let router = artist_router(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/artists/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .body(submit_body(&complete_draft()))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_ids() {
    let (service, _, _) = build_service();
    let router = artist_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/artists/applications/app-unknown")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_route_returns_the_application_view() {
    let (service, _, _) = build_service();
    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");
    let router = artist_router_with_service(service);

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/artists/applications/{}", record.id.0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("application_id").and_then(Value::as_str),
        Some(record.id.0.as_str())
    );
    assert_eq!(payload.get("status"), Some(&json!("pending")));
}

#[tokio::test]
async fn pending_route_lists_the_review_queue() {
    let (service, _, _) = build_service();
    service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");
    let router = artist_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/admin/applications")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("array payload");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("stage_name"), Some(&json!("Nova R")));
}

#[tokio::test]
async fn approve_route_completes_and_conflicts_on_replay() {
    let (service, _, notifier) = build_service();
    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");
    let router = artist_router_with_service(service);

    let uri = format!("/api/v1/admin/applications/{}/approve", record.id.0);
    let response = router
        .clone()
        .oneshot(
            Request::post(uri.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(review_body())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("notification"), Some(&json!("sent")));
    assert_eq!(
        payload.get("profile_stage_name"),
        Some(&json!("Nova R"))
    );
    assert_eq!(notifier.sent().len(), 1);

    let replay = router
        .oneshot(
            Request::post(uri.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(review_body())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(replay.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn reject_route_returns_the_reviewed_record() {
    let (service, _, _) = build_service();
    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");
    let router = artist_router_with_service(service);

    let response = router
        .oneshot(
            Request::post(format!(
                "/api/v1/admin/applications/{}/reject",
                record.id.0
            ))
            .header(header::CONTENT_TYPE, "application/json")
            .body(review_body())
            .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload
            .get("application")
            .and_then(|application| application.get("status")),
        Some(&json!("rejected"))
    );
}

#[tokio::test]
async fn review_routes_return_not_found_for_unknown_ids() {
    let (service, _, _) = build_service();
    let router = artist_router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/admin/applications/app-unknown/approve")
                .header(header::CONTENT_TYPE, "application/json")
                .body(review_body())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
