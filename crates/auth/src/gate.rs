//! Zugangstor: Identitaet an einen Request haengen und bei Bedarf erzwingen
//!
//! Zwei unabhaengige Stufen. `anhaengen` lehnt nie ab, sondern setzt die
//! Identitaet nur, wenn eine gueltige Session vorliegt. `anmeldung_erzwingen`
//! prueft danach, ob eine Identitaet im Kontext steht.

use std::sync::Arc;

use pforte_db::AuthSpeicher;

use crate::error::{AuthError, AuthResult};
use crate::service::{AuthService, Identitaet, TransportAnweisung};

/// Request-lokaler Kontext, explizit durchgereicht
#[derive(Debug, Clone, Default)]
pub struct AnfrageKontext {
    identitaet: Option<Identitaet>,
    transport: TransportAnweisung,
}

impl AnfrageKontext {
    pub fn identitaet(&self) -> Option<&Identitaet> {
        self.identitaet.as_ref()
    }

    pub fn ist_angemeldet(&self) -> bool {
        self.identitaet.is_some()
    }

    /// Was die Transportschicht nach dem Request tun soll
    pub fn transport(&self) -> &TransportAnweisung {
        &self.transport
    }
}

pub struct Zugangstor<R: AuthSpeicher> {
    service: Arc<AuthService<R>>,
}

impl<R: AuthSpeicher> Clone for Zugangstor<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<R: AuthSpeicher> Zugangstor<R> {
    pub fn neu(service: Arc<AuthService<R>>) -> Self {
        Self { service }
    }

    /// Loest den Token auf und haengt das Ergebnis an den Kontext
    ///
    /// Nur Speicherfehler werden weitergegeben; fehlende, unbekannte oder
    /// abgelaufene Tokens ergeben einen anonymen Kontext.
    pub async fn anhaengen(&self, token: Option<&str>, kontext: &mut AnfrageKontext) -> AuthResult<()> {
        let aufloesung = self.service.aufloesen(token).await?;
        kontext.identitaet = aufloesung.identitaet;
        kontext.transport = aufloesung.transport;
        Ok(())
    }
}

/// Verlangt eine angehaengte Identitaet
pub fn anmeldung_erzwingen(kontext: &AnfrageKontext) -> AuthResult<&Identitaet> {
    kontext.identitaet().ok_or(AuthError::NichtAngemeldet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testhilfen::service;

    #[tokio::test]
    async fn ohne_token_anonym_und_abgelehnt() {
        let (service, _, _) = service().await;
        let tor = Zugangstor::neu(service);

        let mut kontext = AnfrageKontext::default();
        tor.anhaengen(None, &mut kontext).await.unwrap();

        assert!(!kontext.ist_angemeldet());
        assert_eq!(kontext.transport(), &TransportAnweisung::Keine);
        assert!(matches!(
            anmeldung_erzwingen(&kontext),
            Err(AuthError::NichtAngemeldet)
        ));
    }

    #[tokio::test]
    async fn gueltige_session_wird_angehaengt() {
        let (service, _, _) = service().await;
        let identitaet = service
            .registrieren("tor@example.com", "passwort123")
            .await
            .unwrap();
        let anmeldung = service.anmelden("tor@example.com", "passwort123").await.unwrap();
        let tor = Zugangstor::neu(Arc::clone(&service));

        let mut kontext = AnfrageKontext::default();
        tor.anhaengen(Some(anmeldung.token.als_str()), &mut kontext)
            .await
            .unwrap();

        let angemeldet = anmeldung_erzwingen(&kontext).expect("Identitaet erwartet");
        assert_eq!(angemeldet, &identitaet);
    }

    #[tokio::test]
    async fn unbekannter_token_loescht_cookie() {
        let (service, _, _) = service().await;
        let tor = Zugangstor::neu(service);

        let mut kontext = AnfrageKontext::default();
        tor.anhaengen(Some("veraltet"), &mut kontext).await.unwrap();

        assert!(!kontext.ist_angemeldet());
        assert_eq!(kontext.transport(), &TransportAnweisung::Loeschen);
    }
}
