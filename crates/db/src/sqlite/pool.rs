//! SQLite-Pool fuer Zugangsdaten und Sessions
//!
//! Schema-Migrationen laufen beim Oeffnen. Fremdschluessel sind immer aktiv,
//! sonst greift das kaskadierende Loeschen der Sessions nicht.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::DbError;
use crate::repository::DatabaseConfig;

/// Wartezeit bei gesperrter Datenbank bevor ein Fehler gemeldet wird
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
}

impl SqliteDb {
    /// Oeffnet (oder erstellt) die Datenbank laut Konfiguration
    pub async fn oeffnen(config: &DatabaseConfig) -> Result<Self, DbError> {
        let journal = if config.sqlite_wal {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };
        let verbindung = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(journal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);
        let pool_optionen = SqlitePoolOptions::new().max_connections(config.max_verbindungen);

        let db = Self::aufbauen(verbindung, pool_optionen).await?;
        info!(
            url = %config.url,
            wal = config.sqlite_wal,
            max_verbindungen = config.max_verbindungen,
            "SQLite-Pool bereit"
        );
        Ok(db)
    }

    /// In-Memory-Datenbank fuer Tests
    ///
    /// Jede Verbindung haette ihre eigene leere Datenbank, daher genau eine,
    /// die nie geschlossen wird.
    pub async fn in_memory() -> Result<Self, DbError> {
        let verbindung = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool_optionen = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);

        Self::aufbauen(verbindung, pool_optionen).await
    }

    async fn aufbauen(
        verbindung: SqliteConnectOptions,
        pool_optionen: SqlitePoolOptions,
    ) -> Result<Self, DbError> {
        let pool = pool_optionen.connect_with(verbindung).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Prueft, ob die Datenbank antwortet (Health-Check)
    pub async fn pruefen(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Schliesst alle Verbindungen; erst nach dem Stoppen des Janitors aufrufen
    pub async fn schliessen(&self) {
        self.pool.close().await;
        info!("SQLite-Pool geschlossen");
    }
}
