//! pforte-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod fehler;
pub mod rest;

use std::sync::Arc;

use config::ServerConfig;
use fehler::ServerFehler;
use pforte_auth::{janitor_starten, AuthService};
use pforte_db::SqliteDb;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen (inkl. Migrationen)
    /// 2. AuthService erstellen, Janitor starten
    /// 3. HTTP-Listener binden und REST-API bedienen
    /// 4. Nach Ctrl-C: Janitor stoppen, dann Pool schliessen
    pub async fn starten(self) -> Result<(), ServerFehler> {
        let auth_konfig = self.config.auth_konfig();

        tracing::info!(url = %self.config.datenbank.url, "Datenbankverbindung wird hergestellt");
        let db = Arc::new(SqliteDb::oeffnen(&self.config.datenbank_config()).await?);

        let service = Arc::new(AuthService::neu(Arc::clone(&db), auth_konfig.clone())?);
        let janitor = janitor_starten(Arc::clone(&service), auth_konfig.bereinigungs_intervall);

        let state = rest::AppState::neu(Arc::clone(&service), self.config.cookie.clone());
        let app = rest::router(state);

        let adresse = self.config.bind_adresse();
        let listener = tokio::net::TcpListener::bind(&adresse).await?;
        tracing::info!(adresse = %adresse, "REST-API bereit");

        let ergebnis = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Some(janitor) = janitor {
            janitor.stoppen().await;
        }
        db.schliessen().await;
        tracing::info!("Server beendet");

        ergebnis.map_err(ServerFehler::from)
    }
}

/// Wartet auf Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
        Err(e) => {
            tracing::error!(fehler = %e, "Signal-Handler konnte nicht installiert werden");
            std::future::pending::<()>().await;
        }
    }
}
