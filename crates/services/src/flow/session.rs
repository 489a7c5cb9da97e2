use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::repository::SessionStore;
use survey_core::model::{ClientId, Response, SessionState, SurveyKey};

use crate::error::FlowError;

pub const CURRENT_SURVEY_KEY: &str = "current_survey";
pub const RESPONSES_KEY: &str = "responses";
pub const COMPLETED_KEY: &str = "completed";
pub const FLASHES_KEY: &str = "flashes";

/// Maps `SessionState` onto the key-value `SessionStore`, one JSON value per key.
#[derive(Clone)]
pub struct SessionAdapter {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionAdapter {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn into_store(self) -> Arc<dyn SessionStore> {
        self.store
    }

    /// Load the client's session, or a fresh one if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Storage` on backend failures and
    /// `FlowError::CorruptSession` for values that do not decode.
    pub async fn load(&self, client: ClientId, now: DateTime<Utc>) -> Result<SessionState, FlowError> {
        let current: Option<SurveyKey> = self.read(client, CURRENT_SURVEY_KEY, now).await?;
        let responses: Option<Vec<Response>> = self.read(client, RESPONSES_KEY, now).await?;
        let completed: Option<bool> = self.read(client, COMPLETED_KEY, now).await?;
        Ok(SessionState::from_parts(
            current,
            responses,
            completed.unwrap_or(false),
        ))
    }

    /// Persist every part of `state`, removing keys for absent parts.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Storage` if the backend rejects a write.
    pub async fn save(
        &self,
        client: ClientId,
        state: &SessionState,
        now: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        match state.current_survey() {
            Some(key) => self.write(client, CURRENT_SURVEY_KEY, key, now).await?,
            None => self.store.remove(client, CURRENT_SURVEY_KEY).await?,
        }
        match state.responses() {
            Some(responses) => self.write(client, RESPONSES_KEY, responses, now).await?,
            None => self.store.remove(client, RESPONSES_KEY).await?,
        }
        self.write(client, COMPLETED_KEY, &state.is_completed(), now)
            .await
    }

    /// Queue a one-shot notice for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` on backend or decoding failures.
    pub async fn push_flash(
        &self,
        client: ClientId,
        message: String,
        now: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        let mut flashes: Vec<String> = self
            .read(client, FLASHES_KEY, now)
            .await?
            .unwrap_or_default();
        flashes.push(message);
        self.write(client, FLASHES_KEY, &flashes, now).await
    }

    /// Return and clear pending notices.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` on backend or decoding failures.
    pub async fn take_flashes(
        &self,
        client: ClientId,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, FlowError> {
        let flashes: Option<Vec<String>> = self.read(client, FLASHES_KEY, now).await?;
        if flashes.is_some() {
            self.store.remove(client, FLASHES_KEY).await?;
        }
        Ok(flashes.unwrap_or_default())
    }

    async fn read<T: DeserializeOwned>(
        &self,
        client: ClientId,
        key: &'static str,
        now: DateTime<Utc>,
    ) -> Result<Option<T>, FlowError> {
        let Some(raw) = self.store.get(client, key, now).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| FlowError::CorruptSession {
                key,
                message: e.to_string(),
            })
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        client: ClientId,
        key: &'static str,
        value: &T,
        now: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        let raw = serde_json::to_string(value).map_err(|e| FlowError::CorruptSession {
            key,
            message: e.to_string(),
        })?;
        self.store.set(client, key, &raw, now, self.ttl).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use survey_core::time::fixed_now;

    fn adapter(repo: &InMemoryRepository) -> SessionAdapter {
        SessionAdapter::new(Arc::new(repo.clone()), Duration::hours(1))
    }

    #[tokio::test]
    async fn missing_session_loads_fresh_state() {
        let repo = InMemoryRepository::new();
        let state = adapter(&repo)
            .load(ClientId::generate(), fixed_now())
            .await
            .unwrap();
        assert_eq!(state, SessionState::new());
    }

    #[tokio::test]
    async fn state_round_trips_and_clears_absent_parts() {
        let repo = InMemoryRepository::new();
        let sessions = adapter(&repo);
        let client = ClientId::generate();
        let now = fixed_now();

        let mut state = SessionState::new();
        state.select(SurveyKey::new("personality"));
        state.restart();
        state.push(Response::new("Yes"));
        sessions.save(client, &state, now).await.unwrap();
        assert_eq!(sessions.load(client, now).await.unwrap(), state);

        state.select(SurveyKey::new("satisfaction"));
        sessions.save(client, &state, now).await.unwrap();
        let reloaded = sessions.load(client, now).await.unwrap();
        assert!(!reloaded.is_started());
        assert_eq!(repo.get(client, RESPONSES_KEY, now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_values_surface_as_errors() {
        let repo = InMemoryRepository::new();
        let client = ClientId::generate();
        let now = fixed_now();
        repo.set(client, RESPONSES_KEY, "not json", now, Duration::hours(1))
            .await
            .unwrap();

        let err = adapter(&repo).load(client, now).await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::CorruptSession {
                key: RESPONSES_KEY,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn flashes_are_consumed_once() {
        let repo = InMemoryRepository::new();
        let sessions = adapter(&repo);
        let client = ClientId::generate();
        let now = fixed_now();

        sessions
            .push_flash(client, "first".into(), now)
            .await
            .unwrap();
        sessions
            .push_flash(client, "second".into(), now)
            .await
            .unwrap();

        assert_eq!(
            sessions.take_flashes(client, now).await.unwrap(),
            ["first", "second"]
        );
        assert!(sessions.take_flashes(client, now).await.unwrap().is_empty());
    }
}
