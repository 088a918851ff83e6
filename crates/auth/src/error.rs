//! Fehlertypen fuer den Auth-Service
//!
//! Validierungs- und Richtlinienfehler gehen mit Details an den Aufrufer.
//! Speicherfehler werden mit vollem Kontext geloggt und nur als opake
//! Varianten weitergereicht; Treibertexte verlassen dieses Crate nicht.

use pforte_db::DbError;
use thiserror::Error;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Eingabe ---
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Identitaet bereits registriert")]
    BereitsVorhanden,

    // --- Authentifizierung ---
    #[error("E-Mail oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("Nicht angemeldet")]
    NichtAngemeldet,

    #[error("Benutzer nicht gefunden")]
    BenutzerNichtGefunden,

    // --- Infrastruktur ---
    #[error("Session konnte nicht erstellt werden")]
    SessionErstellungFehlgeschlagen,

    #[error("Speicher nicht verfuegbar")]
    SpeicherNichtVerfuegbar,

    // --- Konfiguration ---
    #[error("Richtlinienverletzung: {0}")]
    Richtlinie(String),

    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn eingabe(msg: impl Into<String>) -> Self {
        Self::UngueltigeEingabe(msg.into())
    }

    /// Klassifiziert einen Speicherfehler und loggt ihn
    ///
    /// Eindeutigkeitskonflikte werden zu `BereitsVorhanden`, fehlende
    /// Datensaetze zu `BenutzerNichtGefunden`; alles andere wird opak.
    pub fn aus_speicher(operation: &'static str, fehler: DbError) -> Self {
        match fehler {
            DbError::Eindeutigkeit { constraint } => {
                tracing::debug!(operation, constraint = %constraint, "Eindeutigkeitskonflikt");
                Self::BereitsVorhanden
            }
            DbError::NichtGefunden(was) => {
                tracing::debug!(operation, was = %was, "Datensatz nicht gefunden");
                Self::BenutzerNichtGefunden
            }
            andere => {
                tracing::error!(operation, fehler = %andere, "Speicherfehler");
                Self::SpeicherNichtVerfuegbar
            }
        }
    }

    /// true fuer Infrastrukturfehler, die Endnutzern nur generisch gemeldet werden
    pub fn ist_intern(&self) -> bool {
        matches!(
            self,
            Self::SessionErstellungFehlgeschlagen
                | Self::SpeicherNichtVerfuegbar
                | Self::Konfiguration(_)
                | Self::Intern(_)
        )
    }

    /// Meldung, die an nicht vertrauenswuerdige Aufrufer gehen darf
    pub fn oeffentliche_meldung(&self) -> String {
        if self.ist_intern() {
            "interner Fehler".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
