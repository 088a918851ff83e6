//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Config-Datei):
//! - `PF_LOG_LEVEL`: Filter-Direktive (z.B. `info`, `pforte_auth=debug`), Standard: info
//! - `PF_LOG_FORMAT`: Format (text/json), Standard: text

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "PF_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "PF_LOG_FORMAT";

/// Fehler beim Einrichten des Loggings
#[derive(Debug, thiserror::Error)]
pub enum LoggingFehler {
    #[error("Unbekanntes Log-Format '{0}' (erlaubt: text, json)")]
    UnbekanntesFormat(String),

    #[error("Logging bereits initialisiert: {0}")]
    BereitsInitialisiert(String),
}

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingFehler;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            anderes => Err(LoggingFehler::UnbekanntesFormat(anderes.to_string())),
        }
    }
}

/// Bestimmt Filter-Direktive und Format aus Umgebung und Konfiguration
///
/// `env` liefert den Wert einer Umgebungsvariable (injizierbar fuer Tests).
pub fn einstellungen_aufloesen(
    level: &str,
    format: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(String, LogFormat), LoggingFehler> {
    let level = env(ENV_LOG_LEVEL)
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    let format = env(ENV_LOG_FORMAT).unwrap_or_else(|| format.to_string());
    Ok((level, format.parse()?))
}

/// Initialisiert das Logging-System.
///
/// Eine ungueltige Filter-Direktive faellt auf `info` zurueck.
pub fn logging_initialisieren(level: &str, format: &str) -> Result<(), LoggingFehler> {
    let (level, format) = einstellungen_aufloesen(level, format, |k| std::env::var(k).ok())?;

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    ergebnis.map_err(|e| LoggingFehler::BereitsInitialisiert(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ohne_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn log_format_parsen() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(LoggingFehler::UnbekanntesFormat(_))
        ));
        // Gross-/Kleinschreibung
        assert!("JSON".parse::<LogFormat>().is_err());
    }

    #[test]
    fn config_werte_ohne_env() {
        let (level, format) = einstellungen_aufloesen("debug", "json", ohne_env).unwrap();
        assert_eq!(level, "debug");
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn env_hat_vorrang() {
        let env = |k: &str| match k {
            ENV_LOG_LEVEL => Some("pforte_auth=trace".to_string()),
            ENV_LOG_FORMAT => Some("json".to_string()),
            _ => None,
        };
        let (level, format) = einstellungen_aufloesen("info", "text", env).unwrap();
        assert_eq!(level, "pforte_auth=trace");
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn leeres_env_level_wird_ignoriert() {
        let env = |k: &str| (k == ENV_LOG_LEVEL).then(|| "  ".to_string());
        let (level, _) = einstellungen_aufloesen("warn", "text", env).unwrap();
        assert_eq!(level, "warn");
    }

    #[test]
    fn ungueltiges_format_ist_fehler() {
        assert!(einstellungen_aufloesen("info", "yaml", ohne_env).is_err());
    }
}
