//! Session-Cookie lesen, setzen und loeschen

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use pforte_auth::TransportAnweisung;
use pforte_core::SessionToken;
use time::OffsetDateTime;

use crate::config::{CookieEinstellungen, SameSiteModus};

/// Token aus dem Session-Cookie; leere Werte zaehlen als fehlend
pub fn token_lesen<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name).map(|c| c.value()).filter(|v| !v.is_empty())
}

fn same_site(modus: SameSiteModus) -> SameSite {
    match modus {
        SameSiteModus::Strict => SameSite::Strict,
        SameSiteModus::Lax => SameSite::Lax,
        SameSiteModus::None => SameSite::None,
    }
}

/// Cookie fuer eine aktive Session
///
/// Ein nicht positives `Max-Age` (Uhrenabweichung) faellt auf die TTL zurueck.
pub fn session_cookie(
    einstellungen: &CookieEinstellungen,
    token: &SessionToken,
    laeuft_ab_am: DateTime<Utc>,
    jetzt: DateTime<Utc>,
    ttl_sekunden: i64,
) -> Cookie<'static> {
    let mut max_age = (laeuft_ab_am - jetzt).num_seconds();
    if max_age <= 0 {
        max_age = ttl_sekunden;
    }

    let mut builder = Cookie::build((einstellungen.name.clone(), token.als_str().to_owned()))
        .path(einstellungen.pfad.clone())
        .http_only(einstellungen.http_only)
        .secure(einstellungen.secure)
        .same_site(same_site(einstellungen.same_site))
        .max_age(time::Duration::seconds(max_age))
        .expires(OffsetDateTime::from_unix_timestamp(laeuft_ab_am.timestamp()).ok());
    if let Some(domain) = &einstellungen.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Cookie, das den Session-Cookie im Browser entfernt
pub fn loesch_cookie(einstellungen: &CookieEinstellungen) -> Cookie<'static> {
    let mut builder = Cookie::build((einstellungen.name.clone(), ""))
        .path(einstellungen.pfad.clone())
        .http_only(einstellungen.http_only)
        .secure(einstellungen.secure)
        .same_site(same_site(einstellungen.same_site))
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH);
    if let Some(domain) = &einstellungen.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

pub fn anweisung_anwenden(
    jar: CookieJar,
    anweisung: &TransportAnweisung,
    einstellungen: &CookieEinstellungen,
    jetzt: DateTime<Utc>,
    ttl_sekunden: i64,
) -> CookieJar {
    match anweisung {
        TransportAnweisung::Keine => jar,
        TransportAnweisung::Setzen {
            token,
            laeuft_ab_am,
        } => jar.add(session_cookie(
            einstellungen,
            token,
            *laeuft_ab_am,
            jetzt,
            ttl_sekunden,
        )),
        TransportAnweisung::Loeschen => jar.add(loesch_cookie(einstellungen)),
    }
}
