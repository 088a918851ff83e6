//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::time::Duration;

use pforte_auth::config as auth_config;
use pforte_auth::AuthKonfig;
use pforte_db::DatabaseConfig;
use serde::{Deserialize, Serialize};

use crate::fehler::ServerFehler;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Authentifizierung (Sessions, Hashing, Janitor)
    pub auth: AuthEinstellungen,
    /// Session-Cookie
    pub cookie: CookieEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Modus fuer SQLite
    pub wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        let standard = DatabaseConfig::default();
        Self {
            url: standard.url,
            max_verbindungen: standard.max_verbindungen,
            wal: standard.sqlite_wal,
        }
    }
}

/// Auth-Einstellungen (Zeitangaben in Sekunden bzw. Millisekunden)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    pub session_ttl_sek: u64,
    pub arbeitsfaktor: u32,
    pub speicher_kib: u32,
    pub min_passwort_laenge: usize,
    pub starke_passwoerter: bool,
    /// 0 deaktiviert den Janitor
    pub bereinigungs_intervall_sek: u64,
    pub fehlversuch_verzoegerung_ms: u64,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            session_ttl_sek: auth_config::STANDARD_SESSION_TTL.as_secs(),
            arbeitsfaktor: auth_config::STANDARD_ARBEITSFAKTOR,
            speicher_kib: auth_config::STANDARD_SPEICHER_KIB,
            min_passwort_laenge: auth_config::STANDARD_MIN_PASSWORT_LAENGE,
            starke_passwoerter: false,
            bereinigungs_intervall_sek: auth_config::STANDARD_BEREINIGUNGS_INTERVALL.as_secs(),
            fehlversuch_verzoegerung_ms: auth_config::STANDARD_FEHLVERSUCH_VERZOEGERUNG
                .as_millis() as u64,
        }
    }
}

/// SameSite-Attribut des Session-Cookies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSiteModus {
    Strict,
    #[default]
    Lax,
    None,
}

/// Session-Cookie-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieEinstellungen {
    pub name: String,
    /// Leer = Host-only-Cookie
    pub domain: Option<String>,
    pub pfad: String,
    /// In Produktion (HTTPS) auf true setzen
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSiteModus,
}

impl Default for CookieEinstellungen {
    fn default() -> Self {
        Self {
            name: "pforte_session".into(),
            domain: None,
            pfad: "/".into(),
            secure: false,
            http_only: true,
            same_site: SameSiteModus::Lax,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Filter-Direktive: "trace", "debug", "info", "warn", "error" oder EnvFilter-Syntax
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> Result<Self, ServerFehler> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str(&inhalt)
                .map_err(|e| ServerFehler::Konfiguration(format!("Fehler in '{pfad}': {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(ServerFehler::Konfiguration(format!(
                "Datei '{pfad}' nicht lesbar: {e}"
            ))),
        }
    }

    /// Bind-Adresse des HTTP-Servers
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.wal,
        }
    }

    /// Ungepruefte Auth-Konfiguration; validiert wird beim Aufbau des Service
    pub fn auth_konfig(&self) -> AuthKonfig {
        let a = &self.auth;
        AuthKonfig {
            session_ttl: Duration::from_secs(a.session_ttl_sek),
            arbeitsfaktor: a.arbeitsfaktor,
            speicher_kib: a.speicher_kib,
            min_passwort_laenge: a.min_passwort_laenge,
            starke_passwoerter: a.starke_passwoerter,
            bereinigungs_intervall: Duration::from_secs(a.bereinigungs_intervall_sek),
            fehlversuch_verzoegerung: Duration::from_millis(a.fehlversuch_verzoegerung_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.netzwerk.port, 8080);
        assert_eq!(cfg.cookie.name, "pforte_session");
        assert!(cfg.cookie.http_only);
        assert_eq!(cfg.cookie.same_site, SameSiteModus::Lax);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.auth_konfig(), AuthKonfig::default());
        cfg.auth_konfig().validieren().unwrap();
    }

    #[test]
    fn bind_adresse() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_adresse(), "127.0.0.1:8080");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [netzwerk]
            port = 9000

            [auth]
            session_ttl_sek = 3600
            arbeitsfaktor = 3
            bereinigungs_intervall_sek = 0

            [cookie]
            name = "sid"
            domain = "example.com"
            secure = true
            same_site = "strict"
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.netzwerk.port, 9000);
        assert_eq!(cfg.cookie.name, "sid");
        assert_eq!(cfg.cookie.domain.as_deref(), Some("example.com"));
        assert_eq!(cfg.cookie.same_site, SameSiteModus::Strict);
        assert!(cfg.cookie.secure);

        let auth = cfg.auth_konfig();
        assert_eq!(auth.session_ttl, Duration::from_secs(3600));
        assert_eq!(auth.arbeitsfaktor, 3);
        assert!(auth.bereinigungs_intervall.is_zero());
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(auth.min_passwort_laenge, 8);
        assert_eq!(cfg.netzwerk.bind_adresse, "127.0.0.1");
        assert!(cfg.cookie.http_only);
    }

    #[test]
    fn ungueltiger_arbeitsfaktor_faellt_bei_validierung_auf() {
        let cfg: ServerConfig = toml::from_str("[auth]\narbeitsfaktor = 40\n").unwrap();
        assert!(cfg.auth_konfig().validieren().is_err());
    }

    #[test]
    fn fehlende_datei_liefert_standard() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/pforte.toml").unwrap();
        assert_eq!(cfg.netzwerk.port, 8080);
    }

    #[test]
    fn kaputte_datei_ist_fehler() {
        let pfad = std::env::temp_dir().join("pforte_kaputt_test.toml");
        std::fs::write(&pfad, "[netzwerk\nport = ").unwrap();
        let ergebnis = ServerConfig::laden(pfad.to_str().unwrap());
        std::fs::remove_file(&pfad).ok();
        assert!(matches!(ergebnis, Err(ServerFehler::Konfiguration(_))));
    }
}
