//! SQLite-Implementierung des BenutzerRepository

use async_trait::async_trait;
use pforte_core::BenutzerId;
use sqlx::Row as _;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{BenutzerRecord, NeuerBenutzer};
use crate::repository::{BenutzerRepository, DbResult};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::zeit_aus_sekunden;

const EMAIL_CONSTRAINT: &str = "users.email";

#[async_trait]
impl BenutzerRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let id = BenutzerId::new();
        let created_at = data.created_at.timestamp();

        let mut tx = self.pool.begin().await?;

        let vorhanden = sqlx::query("SELECT 1 FROM users WHERE email = ?")
            .bind(data.email)
            .fetch_optional(&mut *tx)
            .await?;
        if vorhanden.is_some() {
            tx.rollback().await?;
            return Err(DbError::eindeutigkeit(EMAIL_CONSTRAINT));
        }

        // Ein paralleler Insert zwischen Pruefung und Insert faellt auf den
        // UNIQUE-Constraint und wird dort klassifiziert.
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.inner().to_string())
        .bind(data.email)
        .bind(data.password_hash)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::klassifizieren(e, EMAIL_CONSTRAINT))?;

        tx.commit().await?;

        Ok(BenutzerRecord {
            id,
            email: data.email.to_string(),
            password_hash: data.password_hash.to_string(),
            created_at: zeit_aus_sekunden(created_at)?,
        })
    }

    async fn get_by_id(&self, id: BenutzerId) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id.inner().to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update_password_hash(&self, id: BenutzerId, password_hash: &str) -> DbResult<bool> {
        let affected = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.inner().to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn replace_password_hash_and_revoke(
        &self,
        id: BenutzerId,
        password_hash: &str,
    ) -> DbResult<u64> {
        let id_str = id.inner().to_string();
        let mut tx = self.pool.begin().await?;

        let aktualisiert = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(&id_str)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if aktualisiert == 0 {
            tx.rollback().await?;
            return Err(DbError::nicht_gefunden(format!("Benutzer {id}")));
        }

        let widerrufen = sqlx::query("DELETE FROM sessions WHERE benutzer_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(widerrufen)
    }

    async fn delete(&self, id: BenutzerId) -> DbResult<bool> {
        // Sessions fallen ueber ON DELETE CASCADE weg
        let affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.inner().to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let created_at: i64 = row.try_get("created_at")?;

    Ok(BenutzerRecord {
        id: BenutzerId(id),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: zeit_aus_sekunden(created_at)?,
    })
}
