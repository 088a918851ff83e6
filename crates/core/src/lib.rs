//! pforte-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Bausteine bereit, die von Datenbank-, Auth- und
//! Server-Crate gemeinsam genutzt werden: ID-Newtypes, den Session-Token
//! und die injizierbare Zeitquelle.

pub mod types;
pub mod uhr;

// Re-Exporte fuer bequemen Zugriff
pub use types::{BenutzerId, SessionToken};
pub use uhr::{FesteUhr, SystemUhr, Uhr};
