//! # pforte-observability
//!
//! Observability-Crate fuer Pforte:
//! - Structured Logging via tracing-subscriber (Text oder JSON)
//! - Request-Tracing-Layer fuer den HTTP-Server

pub mod http;
pub mod logging;

pub use http::anfrage_trace_layer;
pub use logging::{logging_initialisieren, LogFormat, LoggingFehler};
