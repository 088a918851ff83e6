//! Datenbankmodelle fuer Pforte
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Domain-Typen getrennt und dienen als reine Datenuebertragungsobjekte.

use chrono::{DateTime, Utc};
use pforte_core::{BenutzerId, SessionToken};

// ---------------------------------------------------------------------------
// Benutzer (Zugangsdaten)
// ---------------------------------------------------------------------------

/// Zugangsdatensatz aus der Datenbank
#[derive(Clone)]
pub struct BenutzerRecord {
    pub id: BenutzerId,
    /// Normalisierter Identitaetsschluessel (E-Mail)
    pub email: String,
    /// PHC-String des Passwort-Hashes
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// Der Hash gehoert nicht in Logs.
impl std::fmt::Debug for BenutzerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenutzerRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<verborgen>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Session-Datensatz aus der Datenbank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: SessionToken,
    pub benutzer_id: BenutzerId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Eine Session ist gueltig solange `jetzt < expires_at`
    pub fn ist_gueltig(&self, jetzt: DateTime<Utc>) -> bool {
        jetzt.timestamp() < self.expires_at.timestamp()
    }
}

/// Daten zum Erstellen einer neuen Session
#[derive(Debug, Clone)]
pub struct NeueSession<'a> {
    pub token: &'a SessionToken,
    pub benutzer_id: BenutzerId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_verbirgt_hash() {
        let record = BenutzerRecord {
            id: BenutzerId::new(),
            email: "a@b.de".into(),
            password_hash: "$argon2id$geheim".into(),
            created_at: Utc::now(),
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("geheim"));
        assert!(debug.contains("a@b.de"));
    }

    #[test]
    fn gueltigkeit_ist_exklusiv() {
        let ablauf = DateTime::from_timestamp(1_000, 0).unwrap();
        let session = SessionRecord {
            token: SessionToken::new("t"),
            benutzer_id: BenutzerId::new(),
            expires_at: ablauf,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        assert!(session.ist_gueltig(DateTime::from_timestamp(999, 0).unwrap()));
        assert!(!session.ist_gueltig(ablauf));
    }
}
