pub mod client;
pub mod completion;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /jobs/{job_id}/completions                       submit, list
///
/// /completions/{completion_id}                     get
/// /completions/{completion_id}/approve             approve (POST)
/// /completions/{completion_id}/reject              reject (POST)
///
/// /clients/{client_id}                             profile
/// /clients/{client_id}/pending-completions         review queue
/// /clients/{client_id}/verify                      credential check (POST)
///
/// /activity                                        recent events
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/jobs", completion::job_router())
        .nest("/completions", completion::router())
        .nest("/clients", client::router())
        .route("/activity", get(handlers::activity::list_activity))
}
