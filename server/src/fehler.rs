//! Fehler beim Starten und Betreiben des Servers

use pforte_auth::AuthError;
use pforte_db::DbError;
use pforte_observability::LoggingFehler;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerFehler {
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] DbError),

    #[error("Auth-Fehler: {0}")]
    Auth(#[from] AuthError),

    #[error("Logging-Fehler: {0}")]
    Logging(#[from] LoggingFehler),

    #[error("E/A-Fehler: {0}")]
    Io(#[from] std::io::Error),
}
