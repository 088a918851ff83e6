//! Request-Tracing fuer den HTTP-Server
//!
//! Jede Anfrage bekommt einen Span mit Methode und Pfad. Header werden
//! nicht protokolliert, damit Session-Cookies nicht in Logs landen.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Tracing-Layer fuer Axum/Tower
///
/// Spans auf `INFO`, Antworten mit Status und Latenz auf `DEBUG`.
pub fn anfrage_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}
