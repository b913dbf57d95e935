pub mod health;
pub mod metrics;
pub mod students;
pub mod subjects;

pub use health::{health_check, readiness_check};
pub use students::{delete_student, list_students, update_student, upsert_student};
pub use subjects::{create_subject, delete_subject, list_subjects};
