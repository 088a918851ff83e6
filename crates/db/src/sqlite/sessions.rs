//! SQLite-Implementierung des SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pforte_core::{BenutzerId, SessionToken};
use sqlx::Row as _;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NeueSession, SessionRecord};
use crate::repository::{DbResult, SessionRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::zeit_aus_sekunden;

#[async_trait]
impl SessionRepository for SqliteDb {
    async fn create(&self, data: NeueSession<'_>) -> DbResult<SessionRecord> {
        let expires_at = data.expires_at.timestamp();
        let created_at = data.created_at.timestamp();

        sqlx::query(
            "INSERT INTO sessions (token, benutzer_id, expires_at, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(data.token.als_str())
        .bind(data.benutzer_id.inner().to_string())
        .bind(expires_at)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::klassifizieren(e, "sessions.token"))?;

        Ok(SessionRecord {
            token: data.token.clone(),
            benutzer_id: data.benutzer_id,
            expires_at: zeit_aus_sekunden(expires_at)?,
            created_at: zeit_aus_sekunden(created_at)?,
        })
    }

    async fn get_by_token(&self, token: &str) -> DbResult<Option<SessionRecord>> {
        let row = sqlx::query(
            "SELECT token, benutzer_id, expires_at, created_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn delete_by_token(&self, token: &str) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn delete_for_benutzer(&self, id: BenutzerId) -> DbResult<u64> {
        let affected = sqlx::query("DELETE FROM sessions WHERE benutzer_id = ?")
            .bind(id.inner().to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }

    async fn delete_expired(&self, jetzt: DateTime<Utc>) -> DbResult<u64> {
        let affected = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(jetzt.timestamp())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }

    async fn extend(&self, token: &str, expires_at: DateTime<Utc>) -> DbResult<bool> {
        // Einzelnes UPDATE: parallele Verlaengerungen ueberschreiben sich idempotent
        let affected = sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
            .bind(expires_at.timestamp())
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn count_for_benutzer(&self, id: BenutzerId) -> DbResult<u64> {
        let anzahl: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE benutzer_id = ?")
            .bind(id.inner().to_string())
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(anzahl).map_err(|_| DbError::intern(format!("Negative Anzahl: {anzahl}")))
    }
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> DbResult<SessionRecord> {
    let token: String = row.try_get("token")?;

    let benutzer_str: String = row.try_get("benutzer_id")?;
    let benutzer_id = Uuid::parse_str(&benutzer_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{benutzer_str}': {e}")))?;

    let expires_at: i64 = row.try_get("expires_at")?;
    let created_at: i64 = row.try_get("created_at")?;

    Ok(SessionRecord {
        token: SessionToken::from(token),
        benutzer_id: BenutzerId(benutzer_id),
        expires_at: zeit_aus_sekunden(expires_at)?,
        created_at: zeit_aus_sekunden(created_at)?,
    })
}
