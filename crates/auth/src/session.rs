//! Session-Verwaltung
//!
//! Sessions liegen im Speicher-Backend (siehe `pforte-db`). Der Token ist
//! ein opaker 256-Bit-Zufallswert, URL-sicher Base64-kodiert. Die Gueltigkeit
//! wird immer gegen die Uhr des Aufrufers geprueft, nie gegen die Datenbank.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use pforte_core::{BenutzerId, SessionToken};
use pforte_db::{
    models::{NeueSession, SessionRecord},
    SessionRepository,
};
use rand::{rngs::OsRng, RngCore};

use crate::error::{AuthError, AuthResult};

/// `jetzt + ttl`, ohne Ueberlauf
pub fn ablauf_berechnen(jetzt: DateTime<Utc>, ttl: Duration) -> AuthResult<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| jetzt.checked_add_signed(ttl))
        .ok_or_else(|| AuthError::Konfiguration("Session-Ablauf nicht darstellbar".into()))
}

/// Entropie eines Session-Tokens in Bytes
pub const TOKEN_BYTES: usize = 32;

/// Generiert einen kryptografisch sicheren Session-Token
///
/// Schlaegt fehl, wenn die Zufallsquelle des Betriebssystems nicht liefert.
pub fn token_generieren() -> AuthResult<SessionToken> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::intern(format!("Zufallsquelle nicht verfuegbar: {e}")))?;
    Ok(SessionToken::new(URL_SAFE_NO_PAD.encode(bytes)))
}

/// Session-Store ueber einem [`SessionRepository`]
pub struct SessionStore<R: SessionRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: SessionRepository + ?Sized> Clone for SessionStore<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: SessionRepository + ?Sized> SessionStore<R> {
    pub fn neu(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Erstellt eine Session mit `expires_at = jetzt + ttl`
    ///
    /// Fehler des Speichers kommen unklassifiziert zurueck; der Aufrufer
    /// entscheidet, was eine fehlgeschlagene Erstellung bedeutet.
    pub async fn erstellen(
        &self,
        benutzer_id: BenutzerId,
        ttl: Duration,
        jetzt: DateTime<Utc>,
    ) -> AuthResult<SessionRecord> {
        let token = token_generieren()?;
        let expires_at = ablauf_berechnen(jetzt, ttl)?;

        let session = self
            .repo
            .create(NeueSession {
                token: &token,
                benutzer_id,
                expires_at,
                created_at: jetzt,
            })
            .await
            .map_err(|e| AuthError::aus_speicher("session_erstellen", e))?;

        tracing::debug!(
            benutzer_id = %benutzer_id,
            token = %session.token,
            laeuft_ab_am = %session.expires_at,
            "Neue Session erstellt"
        );
        Ok(session)
    }

    /// Laedt eine Session ohne Gueltigkeitspruefung
    pub async fn finden(&self, token: &str) -> AuthResult<Option<SessionRecord>> {
        self.repo
            .get_by_token(token)
            .await
            .map_err(|e| AuthError::aus_speicher("session_laden", e))
    }

    /// Loescht eine Session. Unbekannte Tokens sind kein Fehler.
    pub async fn loeschen(&self, token: &str) -> AuthResult<()> {
        let geloescht = self
            .repo
            .delete_by_token(token)
            .await
            .map_err(|e| AuthError::aus_speicher("session_loeschen", e))?;
        tracing::debug!(geloescht, "Session invalidiert");
        Ok(())
    }

    /// Loescht alle Sessions eines Benutzers
    pub async fn alle_loeschen(&self, benutzer_id: BenutzerId) -> AuthResult<u64> {
        let anzahl = self
            .repo
            .delete_for_benutzer(benutzer_id)
            .await
            .map_err(|e| AuthError::aus_speicher("sessions_widerrufen", e))?;
        if anzahl > 0 {
            tracing::debug!(benutzer_id = %benutzer_id, anzahl, "Alle Sessions invalidiert");
        }
        Ok(anzahl)
    }

    /// Loescht alle Sessions mit `expires_at <= jetzt`
    pub async fn abgelaufene_loeschen(&self, jetzt: DateTime<Utc>) -> AuthResult<u64> {
        self.repo
            .delete_expired(jetzt)
            .await
            .map_err(|e| AuthError::aus_speicher("sessions_bereinigen", e))
    }

    /// Setzt ein neues Ablaufdatum. `false` wenn die Session nicht mehr existiert.
    pub async fn verlaengern(&self, token: &str, laeuft_ab_am: DateTime<Utc>) -> AuthResult<bool> {
        self.repo
            .extend(token, laeuft_ab_am)
            .await
            .map_err(|e| AuthError::aus_speicher("session_verlaengern", e))
    }

    pub async fn anzahl_fuer(&self, benutzer_id: BenutzerId) -> AuthResult<u64> {
        self.repo
            .count_for_benutzer(benutzer_id)
            .await
            .map_err(|e| AuthError::aus_speicher("sessions_zaehlen", e))
    }
}
