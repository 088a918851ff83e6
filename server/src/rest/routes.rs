//! Route-Definitionen fuer die REST-API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use pforte_observability::anfrage_trace_layer;

use crate::rest::{
    handlers,
    middleware::{anmeldung_verlangen, herkunft_pruefen, identitaet_anhaengen},
    AppState,
};

/// Erstellt den vollstaendigen Router
///
/// Layer-Reihenfolge (aussen nach innen): Tracing, Herkunft, Identitaet
/// anhaengen, bei geschuetzten Routen zusaetzlich Anmeldung verlangen.
pub fn router(state: AppState) -> Router {
    let geschuetzt = Router::new()
        .route("/me", get(handlers::ich))
        .route("/password", post(handlers::passwort_aendern))
        .route("/sessions/revoke", post(handlers::alle_widerrufen))
        .route_layer(middleware::from_fn(anmeldung_verlangen));

    Router::new()
        .route("/register", post(handlers::registrieren))
        .route("/login", post(handlers::anmelden))
        .route("/logout", post(handlers::abmelden))
        .route("/health", get(handlers::health))
        .merge(geschuetzt)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identitaet_anhaengen,
        ))
        .layer(middleware::from_fn(herkunft_pruefen))
        .layer(anfrage_trace_layer())
        .with_state(state)
}
