//! Handlers for client-side lookups: profile, review queue, and a
//! side-effect-free credential check.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use freelance_core::credentials::CLIENT_ENTITY;
use freelance_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the verify endpoint.
#[derive(Deserialize)]
pub struct VerifyCredentialsRequest {
    pub client_password: String,
    pub client_signature: String,
}

/// Result of a credential check.
#[derive(Debug, Serialize)]
pub struct VerifyCredentialsResponse {
    pub valid: bool,
}

/// GET /api/v1/clients/{client_id}
///
/// Public client profile. Never includes the password or signature.
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let profile = state
        .completions
        .client_info(&client_id)
        .await
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: CLIENT_ENTITY,
                id: client_id,
            })
        })?;
    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/clients/{client_id}/pending-completions
///
/// Completions awaiting this client's decision, newest first.
pub async fn list_pending_completions(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let records = state.completions.list_pending_by_client(&client_id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/clients/{client_id}/verify
///
/// Check a password and signature pair. Unknown clients are simply invalid.
pub async fn verify_credentials(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(input): Json<VerifyCredentialsRequest>,
) -> AppResult<impl IntoResponse> {
    let valid = state
        .completions
        .validate_client_credentials(&client_id, &input.client_password, &input.client_signature)
        .await;
    Ok(Json(DataResponse {
        data: VerifyCredentialsResponse { valid },
    }))
}
