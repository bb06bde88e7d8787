//! Handlers for the job completion workflow.
//!
//! Freelancers submit completions against a job; the job's client approves
//! or rejects them with their password and signature. Every successful
//! mutation is published on the event bus.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use freelance_core::completion::COMPLETION_ENTITY;
use freelance_core::credentials::CredentialPair;
use freelance_core::error::CoreError;
use freelance_core::service::{ApprovalDecision, CompletionSubmission, RejectionDecision};
use freelance_events::bus::{COMPLETION_APPROVED, COMPLETION_REJECTED, COMPLETION_SUBMITTED};
use freelance_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request bodies
-------------------------------------------------------------------------- */

/// Request body for submitting a completion.
///
/// Notes are capped at 10 000 characters and the list at 50 deliverables.
/// Omitted notes or deliverables deserialize as empty so the workflow's own
/// validation reports them.
#[derive(Deserialize, Validate)]
pub struct SubmitCompletionRequest {
    #[serde(default)]
    #[validate(length(max = 10_000))]
    pub notes: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub deliverables: Vec<String>,
    pub client_password: String,
    pub client_signature: String,
}

/// Request body for the approve endpoint.
#[derive(Deserialize, Validate)]
pub struct ApproveCompletionRequest {
    pub client_password: String,
    pub client_signature: String,
    #[serde(default)]
    #[validate(length(max = 10_000))]
    pub approval_notes: String,
}

/// Request body for the reject endpoint.
#[derive(Deserialize, Validate)]
pub struct RejectCompletionRequest {
    pub client_password: String,
    pub client_signature: String,
    #[serde(default)]
    #[validate(length(max = 2_000))]
    pub rejection_reason: String,
    #[serde(default)]
    #[validate(length(max = 2_000))]
    pub feedback: String,
}

/* --------------------------------------------------------------------------
Handlers
-------------------------------------------------------------------------- */

/// POST /api/v1/jobs/{job_id}/completions
///
/// Submit a completion for a job. The record starts out `pending`.
pub async fn submit_completion(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(input): Json<SubmitCompletionRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let record = state
        .completions
        .submit(CompletionSubmission {
            job_id,
            notes: input.notes,
            deliverables: input.deliverables,
            credentials: CredentialPair::new(input.client_password, input.client_signature),
        })
        .await?;

    let client_id = state.completions.client_for_job(&record.job_id);
    state.event_bus.publish(PlatformEvent::completion(
        COMPLETION_SUBMITTED,
        &record,
        &client_id,
    ));

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/v1/jobs/{job_id}/completions
///
/// List every completion for a job, newest first.
pub async fn list_job_completions(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let records = state.completions.list_by_job(&job_id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/completions/{completion_id}
pub async fn get_completion(
    State(state): State<AppState>,
    Path(completion_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .completions
        .get(&completion_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: COMPLETION_ENTITY,
                id: completion_id,
            })
        })?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/completions/{completion_id}/approve
///
/// Approve a pending completion. Blank notes are replaced with the default
/// feedback message.
pub async fn approve_completion(
    State(state): State<AppState>,
    Path(completion_id): Path<String>,
    Json(input): Json<ApproveCompletionRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let record = state
        .completions
        .approve(ApprovalDecision {
            completion_id,
            credentials: CredentialPair::new(input.client_password, input.client_signature),
            notes: input.approval_notes,
        })
        .await?;

    let client_id = state.completions.client_for_job(&record.job_id);
    state.event_bus.publish(PlatformEvent::completion(
        COMPLETION_APPROVED,
        &record,
        &client_id,
    ));

    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/completions/{completion_id}/reject
///
/// Reject a pending completion. The reason travels on the published event;
/// only `feedback` is kept on the record.
pub async fn reject_completion(
    State(state): State<AppState>,
    Path(completion_id): Path<String>,
    Json(input): Json<RejectCompletionRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let reason = input.rejection_reason.trim().to_string();
    let record = state
        .completions
        .reject(RejectionDecision {
            completion_id,
            credentials: CredentialPair::new(input.client_password, input.client_signature),
            reason: input.rejection_reason,
            feedback: input.feedback,
        })
        .await?;

    let client_id = state.completions.client_for_job(&record.job_id);
    let mut event = PlatformEvent::completion(COMPLETION_REJECTED, &record, &client_id);
    event.payload["reason"] = serde_json::Value::String(reason);
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: record }))
}
