//! Handler for the recent workflow activity feed.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Events returned when no `limit` is given.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;

/// Upper bound on `limit`.
pub const MAX_ACTIVITY_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub limit: Option<usize>,
}

/// GET /api/v1/activity?limit=N
///
/// Most recent workflow events, newest first.
pub async fn list_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    if limit == 0 || limit > MAX_ACTIVITY_LIMIT {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_ACTIVITY_LIMIT}"
        )));
    }

    let events = state.journal.recent(limit).await;
    Ok(Json(DataResponse { data: events }))
}
