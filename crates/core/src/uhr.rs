//! Zeitquelle
//!
//! Alle Ablauf-Entscheidungen laufen ueber eine injizierbare Uhr, damit
//! Tests Ablaufgrenzen sekundengenau pruefen koennen.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Liefert den aktuellen Zeitpunkt
pub trait Uhr: Send + Sync {
    fn jetzt(&self) -> DateTime<Utc>;
}

/// Systemuhr (Produktion)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUhr;

impl Uhr for SystemUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manuell gestellte Uhr mit Sekundenaufloesung (Tests, Simulation)
#[derive(Debug)]
pub struct FesteUhr {
    sekunden: AtomicI64,
}

impl FesteUhr {
    /// Startet bei einem festen Unix-Zeitstempel
    pub fn bei(unix_sekunden: i64) -> Self {
        Self {
            sekunden: AtomicI64::new(unix_sekunden),
        }
    }

    pub fn stellen(&self, unix_sekunden: i64) {
        self.sekunden.store(unix_sekunden, Ordering::SeqCst);
    }

    pub fn vorstellen(&self, sekunden: i64) {
        self.sekunden.fetch_add(sekunden, Ordering::SeqCst);
    }
}

impl Uhr for FesteUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.sekunden.load(Ordering::SeqCst), 0).unwrap_or_default()
    }
}
