use anyhow::anyhow;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{MessageResponse, UpdateStudentRequest, UpsertStudentRequest};
use crate::models::Student;
use crate::services::{record_student_upsert, StoreError, StudentStore, Upserted};
use crate::startup::AppState;

// Every failure on the student routes is a 500, including malformed input.
fn invalid_student(reason: impl std::fmt::Display) -> AppError {
    AppError::InternalError(anyhow!("Student validation failed: {}", reason))
}

fn store_failure(err: StoreError) -> AppError {
    AppError::DatabaseError(anyhow::Error::new(err))
}

#[tracing::instrument(skip(state))]
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    let students = state.store.list_students().await.map_err(store_failure)?;
    Ok(Json(students))
}

/// `POST /students`: 201 when the roll number is new, 200 when an existing record
/// was overwritten.
#[tracing::instrument(skip(state, payload))]
pub async fn upsert_student(
    State(state): State<AppState>,
    payload: Result<Json<UpsertStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let Json(req) = payload.map_err(|e| invalid_student(e.body_text()))?;
    req.validate().map_err(invalid_student)?;

    let roll_no = req.roll_no;
    let upserted = state
        .store
        .upsert_student(req.into())
        .await
        .map_err(store_failure)?;

    record_student_upsert(upserted.outcome());
    tracing::info!(roll_no, outcome = upserted.outcome(), "Student saved");

    let status = match upserted {
        Upserted::Created(_) => StatusCode::CREATED,
        Upserted::Updated(_) => StatusCode::OK,
    };

    Ok((status, Json(upserted.into_inner())))
}

/// `PUT /students/:rollNo`: overwrites the supplied fields and never creates.
#[tracing::instrument(skip(state, roll_no, payload))]
pub async fn update_student(
    State(state): State<AppState>,
    roll_no: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> Result<Json<Student>, AppError> {
    let Path(roll_no) = roll_no.map_err(|e| invalid_student(e.body_text()))?;
    let Json(req) = payload.map_err(|e| invalid_student(e.body_text()))?;

    match state
        .store
        .update_student(roll_no, req.into())
        .await
        .map_err(store_failure)?
    {
        Some(student) => Ok(Json(student)),
        None => Err(AppError::NotFound(anyhow!("Student not found"))),
    }
}

/// `DELETE /students/:rollNo`: succeeds whether or not the student existed.
#[tracing::instrument(skip(state, roll_no))]
pub async fn delete_student(
    State(state): State<AppState>,
    roll_no: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(roll_no) = roll_no.map_err(|e| invalid_student(e.body_text()))?;

    state
        .store
        .delete_student(roll_no)
        .await
        .map_err(store_failure)?;

    Ok(Json(MessageResponse {
        message: "Student deleted",
    }))
}
