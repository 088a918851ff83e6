//! pforte-db – Transaktionaler Speicher
//!
//! Dieses Crate stellt das Repository-Pattern fuer Zugangsdaten und
//! Sessions bereit und implementiert es fuer SQLite (sqlx). Eindeutigkeits-
//! verletzungen werden hier klassifiziert, bevor sie die Auth-Schicht
//! erreichen.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    AuthSpeicher, BenutzerRepository, DatabaseConfig, DbResult, SessionRepository,
};
pub use sqlite::SqliteDb;
