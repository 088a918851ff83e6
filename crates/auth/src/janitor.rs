//! Hintergrund-Bereinigung abgelaufener Sessions
//!
//! Genau ein Task pro Service. `stoppen()` signalisiert ueber einen
//! Oneshot-Kanal und wartet auf das Ende des Tasks; ein laufender Durchgang
//! wird noch abgeschlossen, ein neuer nicht mehr begonnen.

use std::sync::Arc;
use std::time::Duration;

use pforte_db::AuthSpeicher;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::service::AuthService;

/// Handle auf den laufenden Janitor
pub struct JanitorHandle {
    stopp_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl JanitorHandle {
    /// Stoppt den Janitor und wartet, bis der Task beendet ist
    pub async fn stoppen(self) {
        let _ = self.stopp_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(fehler = %e, "Janitor-Task abgebrochen");
        }
        tracing::debug!("Janitor gestoppt");
    }

    pub fn laeuft(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Startet den Janitor. Ein Intervall von 0 deaktiviert ihn.
///
/// Der erste Durchgang erfolgt nach einem vollen Intervall.
pub fn janitor_starten<R: AuthSpeicher>(
    service: Arc<AuthService<R>>,
    intervall: Duration,
) -> Option<JanitorHandle> {
    if intervall.is_zero() {
        tracing::info!("Janitor deaktiviert (Intervall 0)");
        return None;
    }

    let (stopp_tx, mut stopp_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + intervall, intervall);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(intervall_sek = intervall.as_secs_f64(), "Janitor gestartet");

        loop {
            tokio::select! {
                biased;
                // Signal oder fallengelassenes Handle
                _ = &mut stopp_rx => break,
                _ = ticker.tick() => {
                    match service.abgelaufene_bereinigen().await {
                        Ok(0) => {}
                        Ok(anzahl) => {
                            tracing::debug!(anzahl, "Abgelaufene Sessions bereinigt");
                        }
                        Err(e) => {
                            tracing::warn!(fehler = %e, "Bereinigung fehlgeschlagen");
                        }
                    }
                }
            }
        }
    });

    Some(JanitorHandle { stopp_tx, task })
}
