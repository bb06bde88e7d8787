//! Route definitions for the job completion workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::completion;
use crate::state::AppState;

/// Job-scoped completion routes, nested under `/jobs`.
///
/// ```text
/// POST   /{job_id}/completions                submit_completion
/// GET    /{job_id}/completions                list_job_completions
/// ```
pub fn job_router() -> Router<AppState> {
    Router::new().route(
        "/{job_id}/completions",
        post(completion::submit_completion).get(completion::list_job_completions),
    )
}

/// Completion routes, nested under `/completions`.
///
/// ```text
/// GET    /{completion_id}                     get_completion
/// POST   /{completion_id}/approve             approve_completion
/// POST   /{completion_id}/reject              reject_completion
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{completion_id}", get(completion::get_completion))
        .route(
            "/{completion_id}/approve",
            post(completion::approve_completion),
        )
        .route(
            "/{completion_id}/reject",
            post(completion::reject_completion),
        )
}
