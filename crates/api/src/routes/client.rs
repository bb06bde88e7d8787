use axum::routing::{get, post};
use axum::Router;

use crate::handlers::client;
use crate::state::AppState;

/// Client routes, nested under `/clients`.
///
/// ```text
/// GET    /{client_id}                         get_client
/// GET    /{client_id}/pending-completions     list_pending_completions
/// POST   /{client_id}/verify                  verify_credentials
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{client_id}", get(client::get_client))
        .route(
            "/{client_id}/pending-completions",
            get(client::list_pending_completions),
        )
        .route("/{client_id}/verify", post(client::verify_credentials))
}
