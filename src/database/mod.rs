pub mod indexes;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use repository::{Model, Repository};
pub use store::{DatabaseError, Document, DocumentStore};
