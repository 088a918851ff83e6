//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod pool;
pub mod sessions;
pub mod users;

pub use pool::SqliteDb;

use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::repository::DbResult;

/// Zeitstempel werden als Unix-Sekunden (INTEGER) gespeichert
pub(crate) fn zeit_aus_sekunden(sekunden: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp(sekunden, 0)
        .ok_or_else(|| DbError::intern(format!("Ungueltiger Zeitstempel: {sekunden}")))
}
