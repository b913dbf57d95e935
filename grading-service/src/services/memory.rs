use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{Store, StoreError, StudentStore, SubjectStore, Upserted, DUPLICATE_KEY_CODE};
use crate::models::{Student, StudentChanges, Subject};

/// Process-local store with the same keys and ordering as the MongoDB backend.
///
/// Contents are lost on restart. Used for `STORE_BACKEND=memory` and in tests.
#[derive(Default)]
pub struct MemoryStore {
    students: RwLock<Vec<Student>>,
    subjects: RwLock<Vec<Subject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.students.read().await.clone())
    }

    async fn upsert_student(&self, student: Student) -> Result<Upserted<Student>, StoreError> {
        let mut students = self.students.write().await;

        match students.iter_mut().find(|s| s.roll_no == student.roll_no) {
            Some(existing) => {
                existing.student_name = student.student_name;
                existing.marks = student.marks;
                Ok(Upserted::Updated(existing.clone()))
            }
            None => {
                students.push(student.clone());
                Ok(Upserted::Created(student))
            }
        }
    }

    async fn update_student(
        &self,
        roll_no: i64,
        changes: StudentChanges,
    ) -> Result<Option<Student>, StoreError> {
        let mut students = self.students.write().await;

        Ok(students
            .iter_mut()
            .find(|s| s.roll_no == roll_no)
            .map(|existing| {
                changes.apply(existing);
                existing.clone()
            }))
    }

    async fn delete_student(&self, roll_no: i64) -> Result<(), StoreError> {
        let mut students = self.students.write().await;
        if let Some(pos) = students.iter().position(|s| s.roll_no == roll_no) {
            students.remove(pos);
        }
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for MemoryStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        Ok(self.subjects.read().await.clone())
    }

    async fn create_subject(&self, subject: Subject) -> Result<Subject, StoreError> {
        let mut subjects = self.subjects.write().await;

        if subjects.iter().any(|s| s.name == subject.name) {
            return Err(StoreError::DuplicateKey(format!(
                "E{} duplicate key error collection: subjects index: name_unique dup key: {{ name: {:?} }}",
                DUPLICATE_KEY_CODE, subject.name
            )));
        }

        subjects.push(subject.clone());
        Ok(subject)
    }

    async fn delete_subject(&self, name: &str) -> Result<(), StoreError> {
        let mut subjects = self.subjects.write().await;
        if let Some(pos) = subjects.iter().position(|s| s.name == name) {
            subjects.remove(pos);
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
