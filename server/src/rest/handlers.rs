//! Handler fuer Registrierung, Login, Logout und Sessions

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use pforte_auth::{anmeldung_erzwingen, AnfrageKontext, Identitaet, TransportAnweisung};
use serde::{Deserialize, Serialize};

use crate::rest::{cookies, middleware::ApiFehler, AppState};

#[derive(Debug, Deserialize)]
pub struct ZugangsdatenBody {
    pub email: String,
    pub passwort: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswortBody {
    pub neues_passwort: String,
}

#[derive(Debug, Serialize)]
pub struct AnmeldungAntwort {
    pub benutzer: Identitaet,
    pub laeuft_ab_am: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WiderrufAntwort {
    pub widerrufen: u64,
}

/// POST /register
pub async fn registrieren(
    State(state): State<AppState>,
    Json(body): Json<ZugangsdatenBody>,
) -> Result<(StatusCode, Json<Identitaet>), ApiFehler> {
    let identitaet = state.service.registrieren(&body.email, &body.passwort).await?;
    Ok((StatusCode::CREATED, Json(identitaet)))
}

/// POST /login
pub async fn anmelden(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<ZugangsdatenBody>,
) -> Result<(CookieJar, Json<AnmeldungAntwort>), ApiFehler> {
    let anmeldung = state.service.anmelden(&body.email, &body.passwort).await?;
    let jar = state.cookies_anwenden(jar, &anmeldung.transport());
    Ok((
        jar,
        Json(AnmeldungAntwort {
            benutzer: anmeldung.identitaet,
            laeuft_ab_am: anmeldung.laeuft_ab_am,
        }),
    ))
}

/// POST /logout
///
/// Der Cookie wird auch dann geloescht, wenn der Speicher die Session nicht
/// entfernen konnte.
pub async fn abmelden(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Result<StatusCode, ApiFehler>) {
    let token = cookies::token_lesen(&jar, &state.cookie.name).map(str::to_owned);
    match state.service.abmelden(token.as_deref()).await {
        Ok(anweisung) => (state.cookies_anwenden(jar, &anweisung), Ok(StatusCode::NO_CONTENT)),
        Err(e) => (
            state.cookies_anwenden(jar, &TransportAnweisung::Loeschen),
            Err(ApiFehler(e)),
        ),
    }
}

/// GET /me
pub async fn ich(Extension(kontext): Extension<AnfrageKontext>) -> Result<Json<Identitaet>, ApiFehler> {
    Ok(Json(anmeldung_erzwingen(&kontext)?.clone()))
}

/// POST /password – widerruft alle Sessions, auch die aktuelle
pub async fn passwort_aendern(
    State(state): State<AppState>,
    Extension(kontext): Extension<AnfrageKontext>,
    jar: CookieJar,
    Json(body): Json<PasswortBody>,
) -> Result<(CookieJar, Json<WiderrufAntwort>), ApiFehler> {
    let benutzer_id = anmeldung_erzwingen(&kontext)?.benutzer_id;
    let widerrufen = state
        .service
        .passwort_aendern(benutzer_id, &body.neues_passwort)
        .await?;
    let jar = state.cookies_anwenden(jar, &TransportAnweisung::Loeschen);
    Ok((jar, Json(WiderrufAntwort { widerrufen })))
}

/// POST /sessions/revoke – ueberall abmelden
pub async fn alle_widerrufen(
    State(state): State<AppState>,
    Extension(kontext): Extension<AnfrageKontext>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<WiderrufAntwort>), ApiFehler> {
    let benutzer_id = anmeldung_erzwingen(&kontext)?.benutzer_id;
    let widerrufen = state.service.alle_widerrufen(benutzer_id).await?;
    let jar = state.cookies_anwenden(jar, &TransportAnweisung::Loeschen);
    Ok((jar, Json(WiderrufAntwort { widerrufen })))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    let (status, datenbank) = match state.service.speicher().pruefen().await {
        Ok(()) => (StatusCode::OK, true),
        Err(e) => {
            tracing::error!(fehler = %e, "Health-Check: Datenbank nicht erreichbar");
            (StatusCode::SERVICE_UNAVAILABLE, false)
        }
    };
    (
        status,
        Json(serde_json::json!({
            "status": if datenbank { "healthy" } else { "unhealthy" },
            "version": env!("CARGO_PKG_VERSION"),
            "datenbank": datenbank,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
    use pforte_auth::{AuthError, AuthKonfig, AuthService};
    use pforte_db::SqliteDb;

    use super::*;
    use crate::config::CookieEinstellungen;

    async fn state() -> AppState {
        let db = Arc::new(SqliteDb::in_memory().await.unwrap());
        let konfig = AuthKonfig {
            arbeitsfaktor: 1,
            speicher_kib: 1024,
            fehlversuch_verzoegerung: std::time::Duration::ZERO,
            ..Default::default()
        };
        let service = Arc::new(AuthService::neu(db, konfig).unwrap());
        AppState::neu(service, CookieEinstellungen::default())
    }

    fn jar_mit_token(token: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(token));
        CookieJar::from_headers(&headers)
    }

    #[tokio::test]
    async fn abmelden_loescht_cookie() {
        let state = state().await;
        let (jar, ergebnis) = abmelden(State(state), jar_mit_token("pforte_session=abc")).await;

        assert!(matches!(ergebnis, Ok(StatusCode::NO_CONTENT)));
        let cookie = jar.get("pforte_session").expect("Loesch-Cookie erwartet");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[tokio::test]
    async fn abmelden_loescht_cookie_auch_bei_speicherfehler() {
        let state = state().await;
        state.service.speicher().schliessen().await;

        let (jar, ergebnis) =
            abmelden(State(state), jar_mit_token("pforte_session=abc")).await;

        assert!(matches!(
            ergebnis,
            Err(ApiFehler(AuthError::SpeicherNichtVerfuegbar))
        ));
        let cookie = jar.get("pforte_session").expect("Loesch-Cookie erwartet");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
