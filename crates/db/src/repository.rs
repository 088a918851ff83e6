//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Authentifizierungslogik von der
//! konkreten Datenbank-Implementierung. Alle Operationen, die mehrere
//! Schritte umfassen, laufen in der Implementierung in genau einer
//! Transaktion: entweder vollstaendig oder gar nicht.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pforte_core::BenutzerId;

use crate::error::DbError;
use crate::models::{BenutzerRecord, NeueSession, NeuerBenutzer, SessionRecord};

/// Result-Alias fuer Datenbankoperationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://pforte.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://pforte.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Zugangsdaten
#[async_trait]
pub trait BenutzerRepository: Send + Sync {
    /// Legt einen Benutzer an
    ///
    /// Eindeutigkeitspruefung und Insert laufen in einer Transaktion.
    /// Ein Konflikt liefert `DbError::Eindeutigkeit`.
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord>;

    async fn get_by_id(&self, id: BenutzerId) -> DbResult<Option<BenutzerRecord>>;

    /// Sucht anhand der bereits normalisierten E-Mail
    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>>;

    /// Ersetzt nur den Hash (Aufwertung nach Login). `false` wenn der Benutzer fehlt.
    async fn update_password_hash(&self, id: BenutzerId, password_hash: &str) -> DbResult<bool>;

    /// Ersetzt den Hash und loescht alle Sessions des Benutzers atomar
    ///
    /// Gibt die Anzahl der geloeschten Sessions zurueck.
    async fn replace_password_hash_and_revoke(
        &self,
        id: BenutzerId,
        password_hash: &str,
    ) -> DbResult<u64>;

    /// Loescht den Benutzer samt aller Sessions (Cascade)
    async fn delete(&self, id: BenutzerId) -> DbResult<bool>;
}

/// Repository fuer Sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, data: NeueSession<'_>) -> DbResult<SessionRecord>;

    async fn get_by_token(&self, token: &str) -> DbResult<Option<SessionRecord>>;

    /// Idempotent: `false` wenn kein Datensatz existierte
    async fn delete_by_token(&self, token: &str) -> DbResult<bool>;

    async fn delete_for_benutzer(&self, id: BenutzerId) -> DbResult<u64>;

    /// Loescht alle Sessions mit `expires_at <= jetzt`
    async fn delete_expired(&self, jetzt: DateTime<Utc>) -> DbResult<u64>;

    /// Setzt `expires_at` neu. `false` wenn der Token nicht existiert.
    async fn extend(&self, token: &str, expires_at: DateTime<Utc>) -> DbResult<bool>;

    async fn count_for_benutzer(&self, id: BenutzerId) -> DbResult<u64>;
}

/// Alles, was die Auth-Engine vom Speicher braucht
pub trait AuthSpeicher: BenutzerRepository + SessionRepository + 'static {}

impl<T> AuthSpeicher for T where T: BenutzerRepository + SessionRepository + 'static {}
