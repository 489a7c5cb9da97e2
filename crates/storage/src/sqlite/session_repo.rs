use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use survey_core::model::ClientId;

use super::SqliteRepository;
use super::mapping::{client_key, conn, millis, ser};
use crate::repository::{SessionStore, StorageError};

#[async_trait::async_trait]
impl SessionStore for SqliteRepository {
    async fn get(
        &self,
        client: ClientId,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT v.value
            FROM session_values v
            JOIN sessions s ON s.client_id = v.client_id
            WHERE v.client_id = ?1 AND v.key = ?2 AND s.expires_at > ?3
            ",
        )
        .bind(client_key(client))
        .bind(key)
        .bind(millis(now))
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| row.try_get::<String, _>("value").map_err(ser))
            .transpose()
    }

    async fn set(
        &self,
        client: ClientId,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        let client = client_key(client);
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // Values of a lapsed session never carry over.
        sqlx::query(
            r"
            DELETE FROM session_values
            WHERE client_id = ?1
              AND EXISTS (SELECT 1 FROM sessions WHERE client_id = ?1 AND expires_at <= ?2)
            ",
        )
        .bind(&client)
        .bind(millis(now))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO sessions (client_id, expires_at)
            VALUES (?1, ?2)
            ON CONFLICT(client_id) DO UPDATE SET expires_at = excluded.expires_at
            ",
        )
        .bind(&client)
        .bind(millis(now + ttl))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO session_values (client_id, key, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(client_id, key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(&client)
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn remove(&self, client: ClientId, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_values WHERE client_id = ?1 AND key = ?2")
            .bind(client_key(client))
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(millis(now))
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected())
    }
}
