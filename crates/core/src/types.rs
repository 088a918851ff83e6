//! Gemeinsame Identifikationstypen fuer Pforte
//!
//! IDs und Tokens verwenden das Newtype-Pattern um Verwechslungen zur
//! Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Benutzer-ID (Referenz auf einen Zugangsdatensatz)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenutzerId(pub Uuid);

impl BenutzerId {
    /// Erstellt eine neue zufaellige BenutzerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for BenutzerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BenutzerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "benutzer:{}", self.0)
    }
}

/// Opaker Session-Token (URL-sicheres Base64, 256 Bit)
///
/// `Debug` und `Display` geben nur ein kurzes Praefix aus, damit Tokens
/// nicht vollstaendig in Logs landen.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(wert: impl Into<String>) -> Self {
        Self(wert.into())
    }

    /// Der vollstaendige Token-Wert (nur fuer Speicher und Transport)
    pub fn als_str(&self) -> &str {
        &self.0
    }

    /// Kurzes Praefix fuer Log-Ausgaben
    pub fn praefix(&self) -> &str {
        let ende = self
            .0
            .char_indices()
            .nth(6)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..ende]
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken({}…)", self.praefix())
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}…", self.praefix())
    }
}

impl From<String> for SessionToken {
    fn from(wert: String) -> Self {
        Self(wert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benutzer_id_eindeutig() {
        let a = BenutzerId::new();
        let b = BenutzerId::new();
        assert_ne!(a, b, "Zwei neue BenutzerIds muessen verschieden sein");
    }

    #[test]
    fn benutzer_id_display() {
        let id = BenutzerId(Uuid::nil());
        assert!(id.to_string().starts_with("benutzer:"));
    }

    #[test]
    fn ids_sind_serde_kompatibel() {
        let uid = BenutzerId::new();
        let json = serde_json::to_string(&uid).unwrap();
        let uid2: BenutzerId = serde_json::from_str(&json).unwrap();
        assert_eq!(uid, uid2);
    }

    #[test]
    fn token_debug_zeigt_nur_praefix() {
        let token = SessionToken::new("abcdefghijklmnopqrstuvwxyz");
        let debug = format!("{token:?}");
        assert!(debug.contains("abcdef"));
        assert!(!debug.contains("ghijkl"));
        assert_eq!(token.als_str(), "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn kurzer_token_praefix() {
        let token = SessionToken::new("abc");
        assert_eq!(token.praefix(), "abc");
    }
}
