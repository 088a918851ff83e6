//! Integration-Tests fuer SessionRepository (In-Memory SQLite)

use chrono::{DateTime, Utc};
use pforte_core::{BenutzerId, SessionToken};
use pforte_db::{
    models::{NeueSession, NeuerBenutzer},
    BenutzerRepository, SessionRepository, SqliteDb,
};

async fn db() -> SqliteDb {
    SqliteDb::in_memory().await.expect("In-Memory DB konnte nicht erstellt werden")
}

fn zeit(sekunden: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(sekunden, 0).unwrap()
}

async fn erstelle_user(db: &SqliteDb, email: &str) -> BenutzerId {
    BenutzerRepository::create(
        db,
        NeuerBenutzer {
            email,
            password_hash: "hash",
            created_at: zeit(0),
        },
    )
    .await
    .unwrap()
    .id
}

async fn erstelle_session(db: &SqliteDb, token: &str, benutzer_id: BenutzerId, ablauf: i64) {
    SessionRepository::create(
        db,
        NeueSession {
            token: &SessionToken::new(token),
            benutzer_id,
            expires_at: zeit(ablauf),
            created_at: zeit(100),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn session_erstellen_und_laden() {
    let db = db().await;
    let user_id = erstelle_user(&db, "a@example.com").await;

    let session = SessionRepository::create(
        &db,
        NeueSession {
            token: &SessionToken::new("token_a"),
            benutzer_id: user_id,
            expires_at: zeit(3_700),
            created_at: zeit(100),
        },
    )
    .await
    .unwrap();

    assert_eq!(session.benutzer_id, user_id);
    assert_eq!(session.expires_at.timestamp(), 3_700);

    let geladen = SessionRepository::get_by_token(&db, "token_a")
        .await
        .unwrap()
        .expect("Session sollte gefunden werden");
    assert_eq!(geladen, session);

    assert!(SessionRepository::get_by_token(&db, "unbekannt").await.unwrap().is_none());
}

#[tokio::test]
async fn token_ist_eindeutig() {
    let db = db().await;
    let user_id = erstelle_user(&db, "b@example.com").await;
    erstelle_session(&db, "doppelt", user_id, 1_000).await;

    let err = SessionRepository::create(
        &db,
        NeueSession {
            token: &SessionToken::new("doppelt"),
            benutzer_id: user_id,
            expires_at: zeit(2_000),
            created_at: zeit(100),
        },
    )
    .await
    .unwrap_err();
    assert!(err.ist_eindeutigkeit());
}

#[tokio::test]
async fn session_ohne_benutzer_wird_abgelehnt() {
    let db = db().await;

    let ergebnis = SessionRepository::create(
        &db,
        NeueSession {
            token: &SessionToken::new("waise"),
            benutzer_id: BenutzerId::new(),
            expires_at: zeit(2_000),
            created_at: zeit(100),
        },
    )
    .await;
    assert!(ergebnis.is_err(), "Foreign Key muss greifen");
}

#[tokio::test]
async fn loeschen_ist_idempotent() {
    let db = db().await;
    let user_id = erstelle_user(&db, "c@example.com").await;
    erstelle_session(&db, "weg", user_id, 1_000).await;

    assert!(SessionRepository::delete_by_token(&db, "weg").await.unwrap());
    assert!(!SessionRepository::delete_by_token(&db, "weg").await.unwrap());
    assert!(!SessionRepository::delete_by_token(&db, "nie_da").await.unwrap());
}

#[tokio::test]
async fn alle_sessions_eines_benutzers_loeschen() {
    let db = db().await;
    let user_id = erstelle_user(&db, "d@example.com").await;
    let anderer = erstelle_user(&db, "e@example.com").await;

    erstelle_session(&db, "d1", user_id, 1_000).await;
    erstelle_session(&db, "d2", user_id, 1_000).await;
    erstelle_session(&db, "e1", anderer, 1_000).await;

    assert_eq!(SessionRepository::delete_for_benutzer(&db, user_id).await.unwrap(), 2);
    assert_eq!(SessionRepository::delete_for_benutzer(&db, user_id).await.unwrap(), 0);
    assert_eq!(SessionRepository::count_for_benutzer(&db, anderer).await.unwrap(), 1);
}

#[tokio::test]
async fn abgelaufene_loeschen_inklusive_grenze() {
    let db = db().await;
    let user_id = erstelle_user(&db, "f@example.com").await;

    erstelle_session(&db, "alt", user_id, 500).await;
    erstelle_session(&db, "grenze", user_id, 1_000).await;
    erstelle_session(&db, "frisch", user_id, 1_001).await;

    let entfernt = SessionRepository::delete_expired(&db, zeit(1_000)).await.unwrap();
    assert_eq!(entfernt, 2);

    assert!(SessionRepository::get_by_token(&db, "grenze").await.unwrap().is_none());
    assert!(SessionRepository::get_by_token(&db, "frisch").await.unwrap().is_some());

    // Zweiter Lauf findet nichts mehr
    assert_eq!(SessionRepository::delete_expired(&db, zeit(1_000)).await.unwrap(), 0);
}

#[tokio::test]
async fn session_verlaengern() {
    let db = db().await;
    let user_id = erstelle_user(&db, "g@example.com").await;
    erstelle_session(&db, "lang", user_id, 1_000).await;

    assert!(SessionRepository::extend(&db, "lang", zeit(5_000)).await.unwrap());
    let geladen = SessionRepository::get_by_token(&db, "lang").await.unwrap().unwrap();
    assert_eq!(geladen.expires_at.timestamp(), 5_000);

    assert!(!SessionRepository::extend(&db, "fehlt", zeit(5_000)).await.unwrap());
}
