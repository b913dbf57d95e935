use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use super::store::{Store, StoreError, StudentStore, SubjectStore, Upserted, DUPLICATE_KEY_CODE};
use crate::models::{Student, StudentChanges, Subject};

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for grading-service");

        let roll_no_index = IndexModel::builder()
            .keys(doc! { "rollNo": 1 })
            .options(
                IndexOptions::builder()
                    .name("rollNo_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.students()
            .create_index(roll_no_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create rollNo index on students collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on students.rollNo");

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name("name_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.subjects()
            .create_index(name_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create name index on subjects collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on subjects.name");

        Ok(())
    }

    pub fn students(&self) -> Collection<Student> {
        self.db.collection("students")
    }

    pub fn subjects(&self) -> Collection<Subject> {
        self.db.collection("subjects")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            StoreError::DuplicateKey(err.to_string())
        } else {
            StoreError::Backend(anyhow::Error::new(err))
        }
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Backend(anyhow::Error::new(err))
    }
}

fn by_insertion() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

fn set_changes(changes: &StudentChanges) -> Result<Document, StoreError> {
    let mut set = Document::new();
    if let Some(name) = &changes.student_name {
        set.insert("studentName", name.as_str());
    }
    if let Some(marks) = &changes.marks {
        set.insert("marks", mongodb::bson::to_bson(marks)?);
    }
    Ok(set)
}

#[async_trait]
impl StudentStore for MongoDb {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let cursor = self.students().find(None, by_insertion()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn upsert_student(&self, student: Student) -> Result<Upserted<Student>, StoreError> {
        let set = set_changes(&StudentChanges {
            student_name: Some(student.student_name.clone()),
            marks: Some(student.marks.clone()),
        })?;
        // The pre-image tells the two branches apart: none means the upsert inserted.
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();

        let previous = self
            .students()
            .find_one_and_update(doc! { "rollNo": student.roll_no }, doc! { "$set": set }, options)
            .await?;

        Ok(match previous {
            Some(_) => Upserted::Updated(student),
            None => Upserted::Created(student),
        })
    }

    async fn update_student(
        &self,
        roll_no: i64,
        changes: StudentChanges,
    ) -> Result<Option<Student>, StoreError> {
        let filter = doc! { "rollNo": roll_no };

        if changes.is_empty() {
            return Ok(self.students().find_one(filter, None).await?);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let set = set_changes(&changes)?;
        Ok(self
            .students()
            .find_one_and_update(filter, doc! { "$set": set }, options)
            .await?)
    }

    async fn delete_student(&self, roll_no: i64) -> Result<(), StoreError> {
        self.students()
            .delete_one(doc! { "rollNo": roll_no }, None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for MongoDb {
    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let cursor = self.subjects().find(None, by_insertion()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn create_subject(&self, subject: Subject) -> Result<Subject, StoreError> {
        self.subjects().insert_one(&subject, None).await?;
        Ok(subject)
    }

    async fn delete_subject(&self, name: &str) -> Result<(), StoreError> {
        self.subjects()
            .delete_one(doc! { "name": name }, None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for MongoDb {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}
