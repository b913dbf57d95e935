pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoDb;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics, record_student_upsert};
pub use store::{Store, StoreError, StudentStore, SubjectStore, Upserted};
