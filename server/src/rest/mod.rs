//! REST-Interface: Cookie-Transport und Zugangstor als Axum-Middleware

pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use pforte_auth::{AuthService, TransportAnweisung, Zugangstor};
use pforte_db::SqliteDb;

use crate::config::CookieEinstellungen;

/// Axum-State fuer den Pforte-Server
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AuthService<SqliteDb>>,
    pub tor: Zugangstor<SqliteDb>,
    pub cookie: Arc<CookieEinstellungen>,
}

impl AppState {
    pub fn neu(service: Arc<AuthService<SqliteDb>>, cookie: CookieEinstellungen) -> Self {
        Self {
            tor: Zugangstor::neu(Arc::clone(&service)),
            service,
            cookie: Arc::new(cookie),
        }
    }

    /// Setzt die Transport-Anweisung der Engine in Cookies um
    ///
    /// `Max-Age` wird gegen die Uhr der Engine berechnet.
    pub fn cookies_anwenden(&self, jar: CookieJar, anweisung: &TransportAnweisung) -> CookieJar {
        cookies::anweisung_anwenden(
            jar,
            anweisung,
            &self.cookie,
            self.service.jetzt(),
            self.service.konfig().ttl_sekunden(),
        )
    }
}

pub use routes::router;
