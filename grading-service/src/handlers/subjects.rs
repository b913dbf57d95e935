use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{CreateSubjectRequest, MessageResponse};
use crate::models::Subject;
use crate::services::SubjectStore;
use crate::startup::AppState;

fn invalid_subject(reason: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(anyhow!("Subject validation failed: {}", reason))
}

#[tracing::instrument(skip(state))]
pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, AppError> {
    let subjects = state
        .store
        .list_subjects()
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::Error::new(e)))?;
    Ok(Json(subjects))
}

/// `POST /subjects`: a taken name is a 400 carrying the store's message.
#[tracing::instrument(skip(state, payload))]
pub async fn create_subject(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let Json(req) = payload.map_err(|e| invalid_subject(e.body_text()))?;
    req.validate().map_err(invalid_subject)?;

    let subject = state.store.create_subject(req.into()).await?;
    tracing::info!(name = %subject.name, "Subject created");

    Ok((StatusCode::CREATED, Json(subject)))
}

/// `DELETE /subjects/:name`: succeeds whether or not the subject existed.
#[tracing::instrument(skip(state))]
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .store
        .delete_subject(&name)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::Error::new(e)))?;

    Ok(Json(MessageResponse {
        message: "Subject deleted",
    }))
}
