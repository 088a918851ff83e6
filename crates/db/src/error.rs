//! Fehlertypen fuer das Datenbank-Crate
//!
//! Treiberfehler werden an der Adaptergrenze klassifiziert: Verletzungen von
//! Eindeutigkeits-Constraints werden zu [`DbError::Eindeutigkeit`], alles
//! andere bleibt ein opaker Infrastrukturfehler. Aufrufer muessen keine
//! Fehlertexte parsen.

use thiserror::Error;

/// Datenbank-Fehlertypen
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Datensatz nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Eindeutigkeitsverletzung: {constraint}")]
    Eindeutigkeit { constraint: String },

    #[error("SQLx-Fehler: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration-Fehler: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Interner DB-Fehler: {0}")]
    Intern(String),
}

impl DbError {
    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn eindeutigkeit(constraint: impl Into<String>) -> Self {
        Self::Eindeutigkeit {
            constraint: constraint.into(),
        }
    }

    /// Gibt true zurueck wenn es sich um einen Eindeutigkeitsfehler handelt
    pub fn ist_eindeutigkeit(&self) -> bool {
        matches!(self, Self::Eindeutigkeit { .. })
    }

    /// Klassifiziert einen sqlx-Fehler anhand der Fehlerart des Treibers
    ///
    /// `constraint` benennt den betroffenen Constraint, falls der Treiber
    /// keinen Namen liefert (SQLite liefert keinen).
    pub fn klassifizieren(fehler: sqlx::Error, constraint: &str) -> Self {
        if let sqlx::Error::Database(db_fehler) = &fehler {
            if matches!(db_fehler.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                let name = db_fehler.constraint().unwrap_or(constraint);
                return Self::eindeutigkeit(name);
            }
        }
        Self::Sqlx(fehler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eindeutigkeit_erkannt() {
        let e = DbError::eindeutigkeit("users.email");
        assert!(e.ist_eindeutigkeit());
        assert_eq!(e.to_string(), "Eindeutigkeitsverletzung: users.email");
    }

    #[test]
    fn andere_fehler_sind_keine_eindeutigkeit() {
        let e = DbError::klassifizieren(sqlx::Error::RowNotFound, "users.email");
        assert!(!e.ist_eindeutigkeit());
        assert!(matches!(e, DbError::Sqlx(_)));
    }
}
