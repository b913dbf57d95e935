//! The persistence seam handlers are written against.
//!
//! Each handler issues exactly one call on these traits. Implementations rely on
//! the backend's single-record atomicity and hold no locks across calls.

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

use crate::models::{Student, StudentChanges, Subject};

/// MongoDB's duplicate key error code, reused by every backend.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write. Carries the backend's raw message.
    #[error("{0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Backend(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            StoreError::Backend(err) => AppError::DatabaseError(err),
        }
    }
}

/// Which branch an upsert took.
#[derive(Debug, Clone, PartialEq)]
pub enum Upserted<T> {
    Created(T),
    Updated(T),
}

impl<T> Upserted<T> {
    pub fn into_inner(self) -> T {
        match self {
            Upserted::Created(v) | Upserted::Updated(v) => v,
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Upserted::Created(_) => "created",
            Upserted::Updated(_) => "updated",
        }
    }
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// All students in insertion order.
    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;

    /// Creates the student, or overwrites name and marks of the one holding `roll_no`.
    async fn upsert_student(&self, student: Student) -> Result<Upserted<Student>, StoreError>;

    /// Applies `changes` to an existing student. `None` when no student has `roll_no`.
    async fn update_student(
        &self,
        roll_no: i64,
        changes: StudentChanges,
    ) -> Result<Option<Student>, StoreError>;

    /// Removes the student if present. Absent keys are not an error.
    async fn delete_student(&self, roll_no: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError>;

    /// Inserts a new subject. Fails with [`StoreError::DuplicateKey`] if the name is taken.
    async fn create_subject(&self, subject: Subject) -> Result<Subject, StoreError>;

    async fn delete_subject(&self, name: &str) -> Result<(), StoreError>;
}

/// A backend holding both collections, with an explicit lifecycle.
#[async_trait]
pub trait Store: StudentStore + SubjectStore {
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Releases the backend's connections. Called once, after the server has drained.
    async fn shutdown(&self) {}
}
