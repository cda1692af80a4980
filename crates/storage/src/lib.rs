#![forbid(unsafe_code)]

pub mod metadata;
pub mod repository;
pub mod sqlite;

pub use metadata::{MetadataError, load_pool};
pub use repository::{InMemoryRepository, Storage, StorageError, SubmissionRepository, SubmissionRow};
