pub mod student;
pub mod subject;

pub use student::{Marks, Student, StudentChanges};
pub use subject::Subject;
