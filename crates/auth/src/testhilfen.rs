//! Testhilfen: SQLite-Speicher mit abschaltbaren Operationen

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use chrono::{DateTime, Utc};
use pforte_core::{BenutzerId, FesteUhr};
use pforte_db::{
    models::{BenutzerRecord, NeueSession, NeuerBenutzer, SessionRecord},
    BenutzerRepository, DbError, DbResult, SessionRepository, SqliteDb,
};

use crate::config::AuthKonfig;
use crate::service::AuthService;

/// Schnelle Konfiguration: minimaler Arbeitsfaktor, keine Login-Verzoegerung
pub fn test_konfig() -> AuthKonfig {
    AuthKonfig {
        arbeitsfaktor: 1,
        speicher_kib: 1024,
        fehlversuch_verzoegerung: std::time::Duration::ZERO,
        ..Default::default()
    }
}

/// Startzeitpunkt der Test-Uhr
pub const START: i64 = 1_700_000_000;

pub async fn service_mit(
    konfig: AuthKonfig,
) -> (Arc<AuthService<StoerSpeicher>>, Arc<StoerSpeicher>, Arc<FesteUhr>) {
    let speicher = Arc::new(StoerSpeicher::neu().await);
    let uhr = Arc::new(FesteUhr::bei(START));
    let service = AuthService::mit_uhr(Arc::clone(&speicher), konfig, uhr.clone())
        .expect("Testkonfiguration muss gueltig sein");
    (Arc::new(service), speicher, uhr)
}

pub async fn service() -> (Arc<AuthService<StoerSpeicher>>, Arc<StoerSpeicher>, Arc<FesteUhr>) {
    service_mit(test_konfig()).await
}

/// Delegiert an SQLite, kann aber einzelne Operationen fehlschlagen lassen
pub struct StoerSpeicher {
    pub innen: SqliteDb,
    pub session_erstellen_stoeren: AtomicBool,
    pub session_laden_stoeren: AtomicBool,
    pub verlaengern_stoeren: AtomicBool,
    pub hash_update_stoeren: AtomicBool,
    pub bereinigen_stoeren: AtomicBool,
    pub bereinigungen: AtomicU64,
    /// Haelt `delete_expired` an, bis `bereinigung_freigeben` signalisiert
    pub bereinigen_anhalten: AtomicBool,
    pub bereinigung_begonnen: Notify,
    pub bereinigung_freigeben: Notify,
}

impl StoerSpeicher {
    pub async fn neu() -> Self {
        Self {
            innen: SqliteDb::in_memory().await.expect("In-Memory DB"),
            session_erstellen_stoeren: AtomicBool::new(false),
            session_laden_stoeren: AtomicBool::new(false),
            verlaengern_stoeren: AtomicBool::new(false),
            hash_update_stoeren: AtomicBool::new(false),
            bereinigen_stoeren: AtomicBool::new(false),
            bereinigungen: AtomicU64::new(0),
            bereinigen_anhalten: AtomicBool::new(false),
            bereinigung_begonnen: Notify::new(),
            bereinigung_freigeben: Notify::new(),
        }
    }

    fn pruefen(schalter: &AtomicBool) -> DbResult<()> {
        if schalter.load(Ordering::SeqCst) {
            return Err(DbError::intern("simulierter Speicherausfall"));
        }
        Ok(())
    }
}

#[async_trait]
impl BenutzerRepository for StoerSpeicher {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        BenutzerRepository::create(&self.innen, data).await
    }

    async fn get_by_id(&self, id: BenutzerId) -> DbResult<Option<BenutzerRecord>> {
        self.innen.get_by_id(id).await
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
        self.innen.get_by_email(email).await
    }

    async fn update_password_hash(&self, id: BenutzerId, password_hash: &str) -> DbResult<bool> {
        Self::pruefen(&self.hash_update_stoeren)?;
        self.innen.update_password_hash(id, password_hash).await
    }

    async fn replace_password_hash_and_revoke(
        &self,
        id: BenutzerId,
        password_hash: &str,
    ) -> DbResult<u64> {
        self.innen.replace_password_hash_and_revoke(id, password_hash).await
    }

    async fn delete(&self, id: BenutzerId) -> DbResult<bool> {
        self.innen.delete(id).await
    }
}

#[async_trait]
impl SessionRepository for StoerSpeicher {
    async fn create(&self, data: NeueSession<'_>) -> DbResult<SessionRecord> {
        Self::pruefen(&self.session_erstellen_stoeren)?;
        SessionRepository::create(&self.innen, data).await
    }

    async fn get_by_token(&self, token: &str) -> DbResult<Option<SessionRecord>> {
        Self::pruefen(&self.session_laden_stoeren)?;
        self.innen.get_by_token(token).await
    }

    async fn delete_by_token(&self, token: &str) -> DbResult<bool> {
        self.innen.delete_by_token(token).await
    }

    async fn delete_for_benutzer(&self, id: BenutzerId) -> DbResult<u64> {
        self.innen.delete_for_benutzer(id).await
    }

    async fn delete_expired(&self, jetzt: DateTime<Utc>) -> DbResult<u64> {
        self.bereinigungen.fetch_add(1, Ordering::SeqCst);
        if self.bereinigen_anhalten.load(Ordering::SeqCst) {
            self.bereinigung_begonnen.notify_one();
            self.bereinigung_freigeben.notified().await;
        }
        Self::pruefen(&self.bereinigen_stoeren)?;
        self.innen.delete_expired(jetzt).await
    }

    async fn extend(&self, token: &str, expires_at: DateTime<Utc>) -> DbResult<bool> {
        Self::pruefen(&self.verlaengern_stoeren)?;
        self.innen.extend(token, expires_at).await
    }

    async fn count_for_benutzer(&self, id: BenutzerId) -> DbResult<u64> {
        self.innen.count_for_benutzer(id).await
    }
}
