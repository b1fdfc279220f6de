use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::task;

use super::domain::{ApplicationId, UserId};
use super::repository::{ArtistRepository, Notifier, RepositoryError};
use super::service::{ArtistApplicationService, ReviewError, SubmissionError};

/// Page size for the admin pending queue.
pub const DEFAULT_PENDING_LIMIT: usize = 50;

/// Router builder exposing HTTP endpoints for submission and review.
pub fn artist_router<R, N>(service: Arc<ArtistApplicationService<R, N>>) -> Router
where
    R: ArtistRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/artists/applications", post(submit_handler::<R, N>))
        .route(
            "/api/v1/artists/applications/:application_id",
            get(status_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/applications",
            get(pending_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/approve",
            post(approve_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/reject",
            post(reject_handler::<R, N>),
        )
        .with_state(service)
}

/// Submission payload: the full draft plus the owning artist's id.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub artist_id: String,
    pub draft: super::domain::ApplicationDraft,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub reviewer_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

fn internal_error(message: impl ToString) -> Response {
    let payload = json!({ "error": message.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<ArtistApplicationService<R, N>>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    R: ArtistRepository + 'static,
    N: Notifier + 'static,
{
    // The service is synchronous (blocking repository clients underneath).
    let result = task::spawn_blocking(move || {
        let artist_id = UserId(request.artist_id);
        service.submit(request.draft, &artist_id)
    })
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(join_error) => return internal_error(join_error),
    };

    match outcome {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.view())).into_response(),
        Err(SubmissionError::Incomplete { missing }) => {
            let payload = json!({
                "error": "application is missing required fields",
                "missing": missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(SubmissionError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "application already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<ArtistApplicationService<R, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ArtistRepository + 'static,
    N: Notifier + 'static,
{
    let result = task::spawn_blocking(move || {
        let id = ApplicationId(application_id);
        service.get(&id)
    })
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(join_error) => return internal_error(join_error),
    };

    match outcome {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(ReviewError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "application not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn pending_handler<R, N>(
    State(service): State<Arc<ArtistApplicationService<R, N>>>,
) -> Response
where
    R: ArtistRepository + 'static,
    N: Notifier + 'static,
{
    let result = task::spawn_blocking(move || service.pending(DEFAULT_PENDING_LIMIT)).await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(join_error) => return internal_error(join_error),
    };

    match outcome {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn approve_handler<R, N>(
    State(service): State<Arc<ArtistApplicationService<R, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: ArtistRepository + 'static,
    N: Notifier + 'static,
{
    let result = task::spawn_blocking(move || {
        let id = ApplicationId(application_id);
        let reviewer = UserId(request.reviewer_id);
        service.approve(&id, &reviewer)
    })
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(join_error) => return internal_error(join_error),
    };

    match outcome {
        Ok(approved) => {
            let payload = json!({
                "application": approved.application.view(),
                "profile_stage_name": approved.profile.stage_name,
                "notification": match approved.notification {
                    super::service::NotificationStatus::Sent => "sent".to_string(),
                    super::service::NotificationStatus::Failed(reason) => reason,
                },
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => review_error_response(error),
    }
}

pub(crate) async fn reject_handler<R, N>(
    State(service): State<Arc<ArtistApplicationService<R, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: ArtistRepository + 'static,
    N: Notifier + 'static,
{
    let result = task::spawn_blocking(move || {
        let id = ApplicationId(application_id);
        let reviewer = UserId(request.reviewer_id);
        let reason = request.reason.unwrap_or_default();
        service.reject(&id, &reviewer, &reason)
    })
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(join_error) => return internal_error(join_error),
    };

    match outcome {
        Ok(rejected) => {
            let payload = json!({
                "application": rejected.application.view(),
                "notification": match rejected.notification {
                    super::service::NotificationStatus::Sent => "sent".to_string(),
                    super::service::NotificationStatus::Failed(reason) => reason,
                },
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => review_error_response(error),
    }
}

fn review_error_response(error: ReviewError) -> Response {
    match error {
        ReviewError::AlreadyReviewed { status } => {
            let payload = json!({
                "error": "application was already reviewed",
                "status": status.label(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ReviewError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "error": "application not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ReviewError::Repository(RepositoryError::Conflict) => {
            let payload = json!({
                "error": "application was reviewed concurrently",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => internal_error(other),
    }
}
