use chrono::{DateTime, Utc};
use survey_core::model::ClientId;

use crate::repository::StorageError;

/// Timestamps are stored as Unix milliseconds so range comparisons stay numeric.
pub(super) fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(super) fn client_key(client: ClientId) -> String {
    client.to_string()
}

pub(super) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(super) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}
