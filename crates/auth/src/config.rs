//! Konfiguration des Auth-Service
//!
//! Alle Werte haben Standardwerte und werden beim Erstellen des Service
//! validiert. Ein Arbeitsfaktor ausserhalb des sicheren Bereichs ist ein
//! Fehler beim Aufbau, nicht erst zur Laufzeit.

use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Kleinster erlaubter Arbeitsfaktor (Argon2 Iterationen)
pub const ARBEITSFAKTOR_MIN: u32 = 1;
/// Groesster erlaubter Arbeitsfaktor; begrenzt CPU-Last pro Login
pub const ARBEITSFAKTOR_MAX: u32 = 12;
/// Standard-Arbeitsfaktor (OWASP: m=19 MiB, t=2, p=1)
pub const STANDARD_ARBEITSFAKTOR: u32 = 2;

/// Speicherbedarf pro Hash in KiB
pub const SPEICHER_KIB_MIN: u32 = 8;
pub const SPEICHER_KIB_MAX: u32 = 1024 * 1024;
pub const STANDARD_SPEICHER_KIB: u32 = 19 * 1024;

/// Standard-Session-Lebensdauer: 24 Stunden
pub const STANDARD_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Obergrenze der Session-Lebensdauer: 10 Jahre
pub const SESSION_TTL_MAX: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Standard-Intervall fuer den Janitor: 1 Stunde
pub const STANDARD_BEREINIGUNGS_INTERVALL: Duration = Duration::from_secs(60 * 60);

/// Feste Verzoegerung nach fehlgeschlagenem Login
pub const STANDARD_FEHLVERSUCH_VERZOEGERUNG: Duration = Duration::from_millis(250);

pub const STANDARD_MIN_PASSWORT_LAENGE: usize = 8;

/// Konfiguration des Auth-Service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthKonfig {
    /// Lebensdauer einer Session (ganze Sekunden, mindestens 1)
    pub session_ttl: Duration,
    /// Arbeitsfaktor des Passwort-Hashings
    pub arbeitsfaktor: u32,
    /// Speicherbedarf des Passwort-Hashings in KiB
    pub speicher_kib: u32,
    pub min_passwort_laenge: usize,
    /// Verlangt mindestens einen Buchstaben und eine Ziffer
    pub starke_passwoerter: bool,
    /// Intervall des Janitors (0 = deaktiviert)
    pub bereinigungs_intervall: Duration,
    pub fehlversuch_verzoegerung: Duration,
}

impl Default for AuthKonfig {
    fn default() -> Self {
        Self {
            session_ttl: STANDARD_SESSION_TTL,
            arbeitsfaktor: STANDARD_ARBEITSFAKTOR,
            speicher_kib: STANDARD_SPEICHER_KIB,
            min_passwort_laenge: STANDARD_MIN_PASSWORT_LAENGE,
            starke_passwoerter: false,
            bereinigungs_intervall: STANDARD_BEREINIGUNGS_INTERVALL,
            fehlversuch_verzoegerung: STANDARD_FEHLVERSUCH_VERZOEGERUNG,
        }
    }
}

impl AuthKonfig {
    /// Prueft alle Werte
    pub fn validieren(&self) -> AuthResult<()> {
        arbeitsfaktor_pruefen(self.arbeitsfaktor)?;
        speicher_pruefen(self.speicher_kib)?;

        if self.session_ttl.as_secs() == 0 {
            return Err(AuthError::Konfiguration(
                "Session-TTL muss mindestens 1 Sekunde betragen".into(),
            ));
        }
        if self.session_ttl > SESSION_TTL_MAX {
            return Err(AuthError::Konfiguration(format!(
                "Session-TTL darf hoechstens {} Sekunden betragen",
                SESSION_TTL_MAX.as_secs()
            )));
        }
        if self.min_passwort_laenge == 0 {
            return Err(AuthError::Konfiguration(
                "Minimale Passwortlaenge muss mindestens 1 sein".into(),
            ));
        }
        Ok(())
    }

    /// Session-TTL in ganzen Sekunden
    pub fn ttl_sekunden(&self) -> i64 {
        i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Prueft den Arbeitsfaktor gegen den sicheren Bereich
pub fn arbeitsfaktor_pruefen(arbeitsfaktor: u32) -> AuthResult<()> {
    if !(ARBEITSFAKTOR_MIN..=ARBEITSFAKTOR_MAX).contains(&arbeitsfaktor) {
        return Err(AuthError::Richtlinie(format!(
            "Arbeitsfaktor muss in [{ARBEITSFAKTOR_MIN},{ARBEITSFAKTOR_MAX}] liegen; erhalten {arbeitsfaktor}"
        )));
    }
    Ok(())
}

fn speicher_pruefen(speicher_kib: u32) -> AuthResult<()> {
    if !(SPEICHER_KIB_MIN..=SPEICHER_KIB_MAX).contains(&speicher_kib) {
        return Err(AuthError::Richtlinie(format!(
            "Speicherbedarf muss in [{SPEICHER_KIB_MIN},{SPEICHER_KIB_MAX}] KiB liegen; erhalten {speicher_kib}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_konfig_ist_valide() {
        let cfg = AuthKonfig::default();
        cfg.validieren().expect("Standardwerte muessen gueltig sein");
        assert_eq!(cfg.ttl_sekunden(), 86_400);
        assert_eq!(cfg.fehlversuch_verzoegerung, Duration::from_millis(250));
    }

    #[test]
    fn session_ttl_obergrenze() {
        let grenze = AuthKonfig {
            session_ttl: SESSION_TTL_MAX,
            ..Default::default()
        };
        assert!(grenze.validieren().is_ok());

        for ttl in [SESSION_TTL_MAX + Duration::from_secs(1), Duration::from_secs(10_000_000_000_000)] {
            let cfg = AuthKonfig {
                session_ttl: ttl,
                ..Default::default()
            };
            assert!(matches!(cfg.validieren(), Err(AuthError::Konfiguration(_))));
        }
    }

    #[test]
    fn arbeitsfaktor_grenzen() {
        assert!(arbeitsfaktor_pruefen(ARBEITSFAKTOR_MIN).is_ok());
        assert!(arbeitsfaktor_pruefen(ARBEITSFAKTOR_MAX).is_ok());
        assert!(matches!(arbeitsfaktor_pruefen(0), Err(AuthError::Richtlinie(_))));
        assert!(matches!(
            arbeitsfaktor_pruefen(ARBEITSFAKTOR_MAX + 1),
            Err(AuthError::Richtlinie(_))
        ));
    }

    #[test]
    fn ungueltiger_arbeitsfaktor_ist_richtlinienfehler() {
        let cfg = AuthKonfig {
            arbeitsfaktor: 99,
            ..Default::default()
        };
        assert!(matches!(cfg.validieren(), Err(AuthError::Richtlinie(_))));
    }

    #[test]
    fn null_ttl_wird_abgelehnt() {
        let cfg = AuthKonfig {
            session_ttl: Duration::from_millis(500),
            ..Default::default()
        };
        assert!(matches!(cfg.validieren(), Err(AuthError::Konfiguration(_))));
    }

    #[test]
    fn speicher_unter_minimum_wird_abgelehnt() {
        let cfg = AuthKonfig {
            speicher_kib: 4,
            ..Default::default()
        };
        assert!(matches!(cfg.validieren(), Err(AuthError::Richtlinie(_))));
    }
}
