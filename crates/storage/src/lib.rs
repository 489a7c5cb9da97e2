#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{CompletionGuard, InMemoryRepository, SessionStore, Storage, StorageError};
