use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use survey_core::model::{ClientId, SurveyKey};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Per-client key-value session storage.
///
/// Values are opaque strings; the service layer decides their encoding. A
/// client's session expires as a whole once its expiry passes, and every
/// `set` pushes that expiry forward.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a value, treating expired sessions as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(
        &self,
        client: ClientId,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, StorageError>;

    /// Store a value and extend the client's session to `now + ttl`.
    ///
    /// If the client's previous session had already expired at `now`, its
    /// values are discarded first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(
        &self,
        client: ClientId,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(), StorageError>;

    /// Remove a single value. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, client: ClientId, key: &str) -> Result<(), StorageError>;

    /// Drop every session whose expiry is at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;
}

/// Per-client, per-survey "already completed" markers with a bounded lifetime.
#[async_trait]
pub trait CompletionGuard: Send + Sync {
    /// Returns true while an unexpired marker exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn is_marked(
        &self,
        client: ClientId,
        survey: &SurveyKey,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Set or refresh a marker that lives for `ttl` from `marked_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the marker cannot be stored.
    async fn mark(
        &self,
        client: ClientId,
        survey: &SurveyKey,
        marked_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(), StorageError>;

    /// Drop every marker whose expiry is at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;
}

#[derive(Debug, Clone)]
struct SessionEntry {
    expires_at: DateTime<Utc>,
    values: HashMap<String, String>,
}

impl Default for SessionEntry {
    fn default() -> Self {
        Self {
            expires_at: DateTime::<Utc>::MIN_UTC,
            values: HashMap::new(),
        }
    }
}

/// Simple in-memory repository implementation, the default backend.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<ClientId, SessionEntry>>>,
    markers: Arc<Mutex<HashMap<(ClientId, SurveyKey), DateTime<Utc>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn get(
        &self,
        client: ClientId,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(&client)
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.values.get(key).cloned()))
    }

    async fn set(
        &self,
        client: ClientId,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let entry = guard.entry(client).or_default();
        if entry.expires_at <= now {
            entry.values.clear();
        }
        entry.expires_at = now + ttl;
        entry.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, client: ClientId, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if let Some(entry) = guard.get_mut(&client) {
            entry.values.remove(key);
        }
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.len();
        guard.retain(|_, entry| entry.expires_at > now);
        Ok(u64::try_from(before - guard.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl CompletionGuard for InMemoryRepository {
    async fn is_marked(
        &self,
        client: ClientId,
        survey: &SurveyKey,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(&(client, survey.clone()))
            .is_some_and(|expires_at| *expires_at > now))
    }

    async fn mark(
        &self,
        client: ClientId,
        survey: &SurveyKey,
        marked_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert((client, survey.clone()), marked_at + ttl);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.len();
        guard.retain(|_, expires_at| *expires_at > now);
        Ok(u64::try_from(before - guard.len()).unwrap_or(u64::MAX))
    }
}

/// Aggregates the session and completion backends behind trait objects for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
    pub completions: Arc<dyn CompletionGuard>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionStore> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionGuard> = Arc::new(repo);
        Self {
            sessions,
            completions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::time::fixed_now;

    #[tokio::test]
    async fn session_values_are_scoped_per_client() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let alice = ClientId::generate();
        let bob = ClientId::generate();

        repo.set(alice, "responses", "[]", now, Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(
            repo.get(alice, "responses", now).await.unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(repo.get(bob, "responses", now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_sessions_read_as_absent_and_purge() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let client = ClientId::generate();
        repo.set(client, "current_survey", "\"satisfaction\"", now, Duration::minutes(5))
            .await
            .unwrap();

        let later = now + Duration::minutes(5);
        assert_eq!(repo.get(client, "current_survey", later).await.unwrap(), None);
        assert_eq!(SessionStore::purge_expired(&repo, later).await.unwrap(), 1);
        assert_eq!(SessionStore::purge_expired(&repo, later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_after_expiry_starts_a_fresh_session() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let client = ClientId::generate();
        repo.set(client, "responses", "[]", now, Duration::minutes(5))
            .await
            .unwrap();

        let later = now + Duration::minutes(10);
        repo.set(client, "current_survey", "\"personality\"", later, Duration::minutes(5))
            .await
            .unwrap();

        assert_eq!(repo.get(client, "responses", later).await.unwrap(), None);
        assert!(repo.get(client, "current_survey", later).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_drops_single_key() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let client = ClientId::generate();
        let ttl = Duration::hours(1);
        repo.set(client, "a", "1", now, ttl).await.unwrap();
        repo.set(client, "b", "2", now, ttl).await.unwrap();
        repo.remove(client, "a").await.unwrap();

        assert_eq!(repo.get(client, "a", now).await.unwrap(), None);
        assert_eq!(repo.get(client, "b", now).await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn completion_marker_expires_after_ttl() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let client = ClientId::generate();
        let survey = SurveyKey::new("satisfaction");

        assert!(!repo.is_marked(client, &survey, now).await.unwrap());
        repo.mark(client, &survey, now, Duration::seconds(60))
            .await
            .unwrap();

        assert!(repo.is_marked(client, &survey, now + Duration::seconds(59)).await.unwrap());
        assert!(!repo.is_marked(client, &survey, now + Duration::seconds(60)).await.unwrap());
        assert!(
            !repo
                .is_marked(client, &SurveyKey::new("personality"), now)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn purge_drops_only_lapsed_markers() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let client = ClientId::generate();
        let satisfaction = SurveyKey::new("satisfaction");
        let personality = SurveyKey::new("personality");
        repo.mark(client, &satisfaction, now, Duration::seconds(60))
            .await
            .unwrap();
        repo.mark(client, &personality, now, Duration::seconds(120))
            .await
            .unwrap();

        let later = now + Duration::seconds(60);
        assert_eq!(CompletionGuard::purge_expired(&repo, later).await.unwrap(), 1);
        assert_eq!(CompletionGuard::purge_expired(&repo, later).await.unwrap(), 0);
        assert_eq!(repo.markers.lock().unwrap().len(), 1);
        assert!(repo.is_marked(client, &personality, later).await.unwrap());

        // Session purging leaves markers alone.
        assert_eq!(SessionStore::purge_expired(&repo, later).await.unwrap(), 0);
        assert_eq!(repo.markers.lock().unwrap().len(), 1);
    }
}
