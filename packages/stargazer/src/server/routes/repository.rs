use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::intake::IntakeOutcome;
use crate::server::app::AppState;
use crate::types::{stats::Stats, work_item::WorkStatus};

#[derive(Debug, Serialize)]
pub struct RepositoryResponse {
    pub repository: String,
    pub status: WorkStatus,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub stats: Stats,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Record a request for `owner/name` and return its current stats.
///
/// Unknown repositories are queued and come back with empty stats until the
/// crawler generates them.
pub async fn repository_handler(
    Extension(state): Extension<AppState>,
    Path((owner, name)): Path<(String, String)>,
) -> Response {
    if owner.is_empty() || name.is_empty() {
        return error(StatusCode::BAD_REQUEST, "invalid repository path");
    }
    let repository = format!("{owner}/{name}");

    let outcome = match state
        .policy
        .request_repository(&*state.queue, &repository, Utc::now())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(repository = %repository, error = %e, "Intake failed");
            return error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    match outcome {
        IntakeOutcome::Rejected { .. } => {
            error(StatusCode::NOT_FOUND, "repository not tracked")
        }
        IntakeOutcome::Created(item)
        | IntakeOutcome::Requeued(item)
        | IntakeOutcome::Unchanged(item) => Json(RepositoryResponse {
            repository: item.repository,
            status: item.status,
            last_generated_at: item.last_generated_at,
            stats: item.stats,
        })
        .into_response(),
    }
}
