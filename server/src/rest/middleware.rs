//! Axum-Middleware: Herkunftspruefung, Identitaet anhaengen, Anmeldung verlangen

use axum::{
    extract::{Request, State},
    http::{
        header::{HOST, ORIGIN, REFERER, SET_COOKIE},
        HeaderMap, Method, StatusCode, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;
use pforte_auth::{anmeldung_erzwingen, AnfrageKontext, AuthError, TransportAnweisung};
use serde_json::json;

use crate::rest::{cookies, AppState};

/// Fehlerantwort fuer die REST-API
pub fn fehler_antwort(status: StatusCode, nachricht: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": nachricht
            }
        })),
    )
        .into_response()
}

/// AuthError als HTTP-Antwort; interne Fehler nur generisch
#[derive(Debug)]
pub struct ApiFehler(pub AuthError);

impl From<AuthError> for ApiFehler {
    fn from(fehler: AuthError) -> Self {
        Self(fehler)
    }
}

impl IntoResponse for ApiFehler {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AuthError::UngueltigeEingabe(_) | AuthError::Richtlinie(_) => StatusCode::BAD_REQUEST,
            AuthError::BereitsVorhanden => StatusCode::CONFLICT,
            AuthError::UngueltigeAnmeldedaten | AuthError::NichtAngemeldet => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::BenutzerNichtGefunden => StatusCode::NOT_FOUND,
            AuthError::SessionErstellungFehlgeschlagen
            | AuthError::SpeicherNichtVerfuegbar
            | AuthError::Konfiguration(_)
            | AuthError::Intern(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if self.0.ist_intern() {
            tracing::error!(fehler = %self.0, "Anfrage mit internem Fehler beendet");
        }
        fehler_antwort(status, &self.0.oeffentliche_meldung())
    }
}

fn host_aus_url(wert: &str) -> Option<String> {
    let uri: Uri = wert.parse().ok()?;
    uri.authority().map(|a| a.as_str().to_string())
}

/// Same-Origin-Pruefung anhand von `Origin` bzw. `Referer`
///
/// Mit `Origin` muss dessen Host dem Request-Host entsprechen (Schema egal).
/// Ohne `Origin` verlangen unsichere Methoden einen passenden `Referer`;
/// sichere Methoden sind erlaubt.
pub fn gleiche_herkunft(methode: &Method, headers: &HeaderMap, host: Option<&str>) -> bool {
    let Some(host) = host else {
        return false;
    };

    if let Some(origin) = headers.get(ORIGIN) {
        return origin
            .to_str()
            .ok()
            .and_then(host_aus_url)
            .is_some_and(|h| h.eq_ignore_ascii_case(host));
    }

    if !methode.is_safe() {
        return headers
            .get(REFERER)
            .and_then(|r| r.to_str().ok())
            .and_then(host_aus_url)
            .is_some_and(|h| h.eq_ignore_ascii_case(host));
    }
    true
}

/// Axum-Middleware: lehnt zustandsaendernde Anfragen fremder Herkunft ab
pub async fn herkunft_pruefen(req: Request, next: Next) -> Response {
    if req.method().is_safe() {
        return next.run(req).await;
    }

    let host = req
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned)
        .or_else(|| req.uri().authority().map(|a| a.as_str().to_owned()));

    if !gleiche_herkunft(req.method(), req.headers(), host.as_deref()) {
        tracing::warn!(
            methode = %req.method(),
            pfad = %req.uri().path(),
            "Anfrage fremder Herkunft abgelehnt"
        );
        return fehler_antwort(StatusCode::FORBIDDEN, "Herkunft nicht erlaubt");
    }
    next.run(req).await
}

fn cookie_bereits_gesetzt(antwort: &Response, name: &str) -> bool {
    let praefix = format!("{name}=");
    antwort
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&praefix))
}

/// Axum-Middleware: haengt die Identitaet an den Request (lehnt nie ab)
///
/// Der `AnfrageKontext` landet in den Request-Extensions. Verlaengerungen
/// und Loeschungen werden als Cookie an die Antwort gehaengt, sofern der
/// Handler den Session-Cookie nicht selbst gesetzt hat.
pub async fn identitaet_anhaengen(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let mut kontext = AnfrageKontext::default();
    let token = cookies::token_lesen(&jar, &state.cookie.name);
    if let Err(e) = state.tor.anhaengen(token, &mut kontext).await {
        return ApiFehler(e).into_response();
    }

    let anweisung = kontext.transport().clone();
    req.extensions_mut().insert(kontext);

    let antwort = next.run(req).await;

    if anweisung == TransportAnweisung::Keine || cookie_bereits_gesetzt(&antwort, &state.cookie.name)
    {
        return antwort;
    }
    let jar = state.cookies_anwenden(CookieJar::new(), &anweisung);
    (jar, antwort).into_response()
}

/// Axum-Middleware: verlangt eine angehaengte Identitaet
pub async fn anmeldung_verlangen(req: Request, next: Next) -> Response {
    let angemeldet = req
        .extensions()
        .get::<AnfrageKontext>()
        .is_some_and(|k| anmeldung_erzwingen(k).is_ok());

    if !angemeldet {
        return ApiFehler(AuthError::NichtAngemeldet).into_response();
    }
    next.run(req).await
}
