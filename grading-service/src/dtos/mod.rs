pub mod students;
pub mod subjects;

pub use students::{UpdateStudentRequest, UpsertStudentRequest};
pub use subjects::CreateSubjectRequest;

use serde::Serialize;

/// `{"message": ...}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
