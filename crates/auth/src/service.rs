//! Auth-Service
//!
//! Zentraler Einstiegspunkt fuer Registrierung, Login, Session-Aufloesung,
//! Logout, Passwortwechsel und Widerruf. Ein Session-Token durchlaeuft
//! genau die Zustaende Ausgestellt -> (Verlaengert)* -> Abgelaufen oder
//! Widerrufen; einen Weg zurueck gibt es nicht.
//!
//! Die Konfiguration liegt als unveraenderlicher Snapshot vor. Leser klonen
//! den `Arc`, Schreiber tauschen ihn komplett aus.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pforte_core::{BenutzerId, SessionToken, SystemUhr, Uhr};
use pforte_db::{
    models::{BenutzerRecord, NeuerBenutzer},
    AuthSpeicher, BenutzerRepository,
};
use serde::Serialize;

use crate::{
    config::{arbeitsfaktor_pruefen, AuthKonfig},
    error::{AuthError, AuthResult},
    password::{
        eventuell_aufwerten_blockierend, passwort_hashen_blockierend,
        passwort_richtlinie_pruefen, passwort_verifizieren_blockierend,
    },
    session::{ablauf_berechnen, SessionStore},
};

/// Eine Session wird verlaengert, sobald hoechstens 1/N ihrer TTL uebrig ist
const VERLAENGERUNGS_NENNER: i64 = 5;

/// Oeffentliche Sicht auf einen Zugangsdatensatz (ohne Hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identitaet {
    pub benutzer_id: BenutzerId,
    pub email: String,
    pub erstellt_am: DateTime<Utc>,
}

impl From<&BenutzerRecord> for Identitaet {
    fn from(record: &BenutzerRecord) -> Self {
        Self {
            benutzer_id: record.id,
            email: record.email.clone(),
            erstellt_am: record.created_at,
        }
    }
}

/// Anweisung an die Transportschicht (Cookie setzen, loeschen oder nichts)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransportAnweisung {
    #[default]
    Keine,
    Setzen {
        token: SessionToken,
        laeuft_ab_am: DateTime<Utc>,
    },
    Loeschen,
}

/// Ergebnis eines erfolgreichen Logins
#[derive(Debug, Clone)]
pub struct Anmeldung {
    pub identitaet: Identitaet,
    pub token: SessionToken,
    pub laeuft_ab_am: DateTime<Utc>,
}

impl Anmeldung {
    pub fn transport(&self) -> TransportAnweisung {
        TransportAnweisung::Setzen {
            token: self.token.clone(),
            laeuft_ab_am: self.laeuft_ab_am,
        }
    }
}

/// Ergebnis einer Session-Aufloesung
#[derive(Debug, Clone, Default)]
pub struct Aufloesung {
    pub identitaet: Option<Identitaet>,
    pub transport: TransportAnweisung,
}

impl Aufloesung {
    fn anonym(transport: TransportAnweisung) -> Self {
        Self {
            identitaet: None,
            transport,
        }
    }
}

/// Trimmt und wandelt in Kleinbuchstaben
pub fn email_normalisieren(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimale Formpruefung `lokal@domain.tld`, keine RFC-Validierung
pub fn email_gueltig(email: &str) -> bool {
    let mut teile = email.split('@');
    match (teile.next(), teile.next(), teile.next()) {
        (Some(lokal), Some(domain), None) => {
            !lokal.is_empty() && !domain.is_empty() && domain.contains('.')
        }
        _ => false,
    }
}

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<R: AuthSpeicher> {
    speicher: Arc<R>,
    sessions: SessionStore<R>,
    konfig: RwLock<Arc<AuthKonfig>>,
    uhr: Arc<dyn Uhr>,
}

impl<R: AuthSpeicher> AuthService<R> {
    /// Erstellt einen Service mit der Systemuhr
    pub fn neu(speicher: Arc<R>, konfig: AuthKonfig) -> AuthResult<Self> {
        Self::mit_uhr(speicher, konfig, Arc::new(SystemUhr))
    }

    /// Erstellt einen Service mit eigener Zeitquelle
    ///
    /// Die Konfiguration wird hier validiert; ein ungueltiger Arbeitsfaktor
    /// verhindert den Aufbau.
    pub fn mit_uhr(speicher: Arc<R>, konfig: AuthKonfig, uhr: Arc<dyn Uhr>) -> AuthResult<Self> {
        konfig.validieren()?;
        Ok(Self {
            sessions: SessionStore::neu(Arc::clone(&speicher)),
            speicher,
            konfig: RwLock::new(Arc::new(konfig)),
            uhr,
        })
    }

    /// Aktueller Konfigurations-Snapshot
    pub fn konfig(&self) -> Arc<AuthKonfig> {
        Arc::clone(&*self.konfig.read())
    }

    pub fn speicher(&self) -> &Arc<R> {
        &self.speicher
    }

    /// Aktuelle Zeit der Engine, auf ganze Sekunden gekuerzt
    pub fn jetzt(&self) -> DateTime<Utc> {
        let jetzt = self.uhr.jetzt();
        DateTime::from_timestamp(jetzt.timestamp(), 0).unwrap_or(jetzt)
    }

    /// Setzt den Arbeitsfaktor fuer neue Hashes
    ///
    /// Bestehende Hashes werden beim naechsten erfolgreichen Login aufgewertet.
    pub fn arbeitsfaktor_setzen(&self, arbeitsfaktor: u32) -> AuthResult<()> {
        arbeitsfaktor_pruefen(arbeitsfaktor)?;
        let mut snapshot = self.konfig.write();
        let mut neu = AuthKonfig::clone(&**snapshot);
        neu.arbeitsfaktor = arbeitsfaktor;
        *snapshot = Arc::new(neu);
        tracing::info!(arbeitsfaktor, "Arbeitsfaktor geaendert");
        Ok(())
    }

    /// Registriert einen neuen Benutzer
    pub async fn registrieren(&self, email: &str, passwort: &str) -> AuthResult<Identitaet> {
        let konfig = self.konfig();
        let email = email_normalisieren(email);
        if !email_gueltig(&email) {
            return Err(AuthError::eingabe("Ungueltige E-Mail-Adresse"));
        }
        passwort_richtlinie_pruefen(
            passwort,
            konfig.min_passwort_laenge,
            konfig.starke_passwoerter,
        )?;

        let hash = passwort_hashen_blockierend(
            passwort.to_owned(),
            konfig.arbeitsfaktor,
            konfig.speicher_kib,
        )
        .await?;

        let benutzer = BenutzerRepository::create(
            &*self.speicher,
            NeuerBenutzer {
                email: &email,
                password_hash: &hash,
                created_at: self.jetzt(),
            },
        )
        .await
        .map_err(|e| AuthError::aus_speicher("benutzer_erstellen", e))?;

        tracing::info!(benutzer_id = %benutzer.id, "Neuer Benutzer registriert");
        Ok(Identitaet::from(&benutzer))
    }

    /// Meldet einen Benutzer an und erstellt eine neue Session
    ///
    /// Unbekannte E-Mail und falsches Passwort liefern denselben Fehler nach
    /// derselben Verzoegerung.
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<Anmeldung> {
        let konfig = self.konfig();
        let email = email_normalisieren(email);

        let benutzer = BenutzerRepository::get_by_email(&*self.speicher, &email)
            .await
            .map_err(|e| AuthError::aus_speicher("benutzer_laden", e))?;

        let Some(benutzer) = benutzer else {
            tracing::debug!("Login fuer unbekannte E-Mail");
            return Err(self.fehlversuch(&konfig).await);
        };

        let korrekt =
            passwort_verifizieren_blockierend(passwort.to_owned(), benutzer.password_hash.clone())
                .await?;
        if !korrekt {
            tracing::warn!(benutzer_id = %benutzer.id, "Fehlgeschlagener Login-Versuch");
            return Err(self.fehlversuch(&konfig).await);
        }

        self.hash_aufwerten(&benutzer, passwort, &konfig).await;

        let session = self
            .sessions
            .erstellen(benutzer.id, konfig.session_ttl, self.jetzt())
            .await
            .map_err(|e| {
                tracing::error!(benutzer_id = %benutzer.id, fehler = %e, "Session-Erstellung fehlgeschlagen");
                AuthError::SessionErstellungFehlgeschlagen
            })?;

        tracing::info!(benutzer_id = %benutzer.id, "Benutzer angemeldet");

        Ok(Anmeldung {
            identitaet: Identitaet::from(&benutzer),
            token: session.token,
            laeuft_ab_am: session.expires_at,
        })
    }

    async fn fehlversuch(&self, konfig: &AuthKonfig) -> AuthError {
        if !konfig.fehlversuch_verzoegerung.is_zero() {
            tokio::time::sleep(konfig.fehlversuch_verzoegerung).await;
        }
        AuthError::UngueltigeAnmeldedaten
    }

    /// Wertet den Hash nach erfolgreichem Login auf; Fehler werden nur geloggt
    async fn hash_aufwerten(&self, benutzer: &BenutzerRecord, passwort: &str, konfig: &AuthKonfig) {
        let neu = match eventuell_aufwerten_blockierend(
            passwort.to_owned(),
            benutzer.password_hash.clone(),
            konfig.arbeitsfaktor,
            konfig.speicher_kib,
        )
        .await
        {
            Ok(Some(hash)) => hash,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(benutzer_id = %benutzer.id, fehler = %e, "Hash-Aufwertung fehlgeschlagen");
                return;
            }
        };

        match BenutzerRepository::update_password_hash(&*self.speicher, benutzer.id, &neu).await {
            Ok(_) => tracing::info!(
                benutzer_id = %benutzer.id,
                arbeitsfaktor = konfig.arbeitsfaktor,
                "Passwort-Hash aufgewertet"
            ),
            Err(e) => {
                tracing::warn!(benutzer_id = %benutzer.id, fehler = %e, "Aufgewerteter Hash nicht gespeichert")
            }
        }
    }

    /// Loest einen Session-Token zur Identitaet auf
    ///
    /// Abgelaufene Sessions werden sofort entfernt. Ist hoechstens ein
    /// Fuenftel der TTL uebrig, wird die Session auf `jetzt + TTL` verlaengert.
    pub async fn aufloesen(&self, token: Option<&str>) -> AuthResult<Aufloesung> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Aufloesung::anonym(TransportAnweisung::Keine));
        };

        let Some(session) = self.sessions.finden(token).await? else {
            return Ok(Aufloesung::anonym(TransportAnweisung::Loeschen));
        };

        let jetzt = self.jetzt();
        if !session.ist_gueltig(jetzt) {
            self.still_loeschen(token).await;
            tracing::debug!(token = %session.token, "Abgelaufene Session entfernt");
            return Ok(Aufloesung::anonym(TransportAnweisung::Loeschen));
        }

        let benutzer = BenutzerRepository::get_by_id(&*self.speicher, session.benutzer_id)
            .await
            .map_err(|e| AuthError::aus_speicher("benutzer_laden", e))?;
        let Some(benutzer) = benutzer else {
            self.still_loeschen(token).await;
            return Ok(Aufloesung::anonym(TransportAnweisung::Loeschen));
        };

        let konfig = self.konfig();
        let ttl = konfig.ttl_sekunden();
        let verbleibend = session.expires_at.timestamp() - jetzt.timestamp();

        let mut transport = TransportAnweisung::Keine;
        if verbleibend.saturating_mul(VERLAENGERUNGS_NENNER) <= ttl {
            let laeuft_ab_am = ablauf_berechnen(jetzt, konfig.session_ttl)?;
            match self.sessions.verlaengern(token, laeuft_ab_am).await {
                Ok(true) => {
                    tracing::debug!(benutzer_id = %benutzer.id, "Session verlaengert");
                    transport = TransportAnweisung::Setzen {
                        token: session.token,
                        laeuft_ab_am,
                    };
                }
                // Zwischen Laden und Verlaengern widerrufen
                Ok(false) => return Ok(Aufloesung::anonym(TransportAnweisung::Loeschen)),
                Err(e) => {
                    tracing::warn!(benutzer_id = %benutzer.id, fehler = %e, "Verlaengerung fehlgeschlagen");
                }
            }
        }

        Ok(Aufloesung {
            identitaet: Some(Identitaet::from(&benutzer)),
            transport,
        })
    }

    async fn still_loeschen(&self, token: &str) {
        if let Err(e) = self.sessions.loeschen(token).await {
            tracing::warn!(fehler = %e, "Session konnte nicht entfernt werden");
        }
    }

    /// Meldet ab. Ohne oder mit unbekanntem Token kein Fehler.
    pub async fn abmelden(&self, token: Option<&str>) -> AuthResult<TransportAnweisung> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.sessions.loeschen(token).await?;
            tracing::debug!("Session invalidiert (Abmeldung)");
        }
        Ok(TransportAnweisung::Loeschen)
    }

    /// Setzt ein neues Passwort und widerruft alle Sessions des Benutzers
    ///
    /// Hash-Ersatz und Widerruf laufen in einer Transaktion. Gibt die Anzahl
    /// der widerrufenen Sessions zurueck.
    pub async fn passwort_aendern(
        &self,
        benutzer_id: BenutzerId,
        neues_passwort: &str,
    ) -> AuthResult<u64> {
        let konfig = self.konfig();
        passwort_richtlinie_pruefen(
            neues_passwort,
            konfig.min_passwort_laenge,
            konfig.starke_passwoerter,
        )?;

        let hash = passwort_hashen_blockierend(
            neues_passwort.to_owned(),
            konfig.arbeitsfaktor,
            konfig.speicher_kib,
        )
        .await?;

        let widerrufen =
            BenutzerRepository::replace_password_hash_and_revoke(&*self.speicher, benutzer_id, &hash)
                .await
                .map_err(|e| AuthError::aus_speicher("passwort_ersetzen", e))?;

        tracing::info!(benutzer_id = %benutzer_id, widerrufen, "Passwort geaendert");
        Ok(widerrufen)
    }

    /// Widerruft alle Sessions eines Benutzers ("ueberall abmelden")
    pub async fn alle_widerrufen(&self, benutzer_id: BenutzerId) -> AuthResult<u64> {
        let anzahl = self.sessions.alle_loeschen(benutzer_id).await?;
        tracing::info!(benutzer_id = %benutzer_id, anzahl, "Alle Sessions widerrufen");
        Ok(anzahl)
    }

    /// Entfernt alle abgelaufenen Sessions
    pub async fn abgelaufene_bereinigen(&self) -> AuthResult<u64> {
        self.sessions.abgelaufene_loeschen(self.jetzt()).await
    }

    /// Loescht einen Benutzer samt aller Sessions
    pub async fn benutzer_loeschen(&self, benutzer_id: BenutzerId) -> AuthResult<bool> {
        let geloescht = BenutzerRepository::delete(&*self.speicher, benutzer_id)
            .await
            .map_err(|e| AuthError::aus_speicher("benutzer_loeschen", e))?;
        if geloescht {
            tracing::info!(benutzer_id = %benutzer_id, "Benutzer geloescht");
        }
        Ok(geloescht)
    }

    /// Anzahl der gespeicherten Sessions eines Benutzers (auch abgelaufene)
    pub async fn sessions_zaehlen(&self, benutzer_id: BenutzerId) -> AuthResult<u64> {
        self.sessions.anzahl_fuer(benutzer_id).await
    }
}
