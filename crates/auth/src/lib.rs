//! pforte-auth – Session-basierte Authentifizierung
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id (aufwertbarer Arbeitsfaktor)
//! - Session-Verwaltung ueber den Speicher aus `pforte-db`
//! - AuthService (Registrierung, Login, Aufloesung, Logout, Passwortwechsel)
//! - Janitor (periodische Bereinigung abgelaufener Sessions)
//! - Zugangstor (Identitaet anhaengen, Anmeldung erzwingen)

pub mod config;
pub mod error;
pub mod gate;
pub mod janitor;
pub mod password;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod testhilfen;

// Bequeme Re-Exporte
pub use config::AuthKonfig;
pub use error::{AuthError, AuthResult};
pub use gate::{anmeldung_erzwingen, AnfrageKontext, Zugangstor};
pub use janitor::{janitor_starten, JanitorHandle};
pub use password::{passwort_hashen, passwort_verifizieren};
pub use service::{Anmeldung, Aufloesung, AuthService, Identitaet, TransportAnweisung};
pub use session::SessionStore;
