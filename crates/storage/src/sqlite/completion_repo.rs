use chrono::{DateTime, Duration, Utc};
use survey_core::model::{ClientId, SurveyKey};

use super::SqliteRepository;
use super::mapping::{client_key, conn, millis};
use crate::repository::{CompletionGuard, StorageError};

#[async_trait::async_trait]
impl CompletionGuard for SqliteRepository {
    async fn is_marked(
        &self,
        client: ClientId,
        survey: &SurveyKey,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let row = sqlx::query(
            r"
            SELECT 1 FROM completion_markers
            WHERE client_id = ?1 AND survey_key = ?2 AND expires_at > ?3
            ",
        )
        .bind(client_key(client))
        .bind(survey.as_str())
        .bind(millis(now))
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        Ok(row.is_some())
    }

    async fn mark(
        &self,
        client: ClientId,
        survey: &SurveyKey,
        marked_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO completion_markers (client_id, survey_key, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(client_id, survey_key) DO UPDATE SET expires_at = excluded.expires_at
            ",
        )
        .bind(client_key(client))
        .bind(survey.as_str())
        .bind(millis(marked_at + ttl))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM completion_markers WHERE expires_at <= ?1")
            .bind(millis(now))
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected())
    }
}
