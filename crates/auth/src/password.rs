//! Passwort-Hashing mit Argon2id
//!
//! Der Arbeitsfaktor ist die Argon2-Iterationszahl (`t`). Er steht im
//! PHC-String jedes Hashes, damit alte Hashes nach einer Erhoehung beim
//! naechsten erfolgreichen Login aufgewertet werden koennen.
//!
//! Hashing ist bewusst teuer; die `*_blockierend`-Varianten laufen im
//! Blocking-Pool von Tokio.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use rand::rngs::OsRng;

use crate::config::arbeitsfaktor_pruefen;
use crate::error::{AuthError, AuthResult};

/// Argon2id mit dem gegebenen Arbeitsfaktor und Speicherbedarf
fn argon2_instanz(arbeitsfaktor: u32, speicher_kib: u32) -> AuthResult<Argon2<'static>> {
    arbeitsfaktor_pruefen(arbeitsfaktor)?;

    let params = Params::new(
        speicher_kib,  // m_cost
        arbeitsfaktor, // t_cost
        1,             // p_cost: 1 Thread
        None,          // output_len: Standard (32 Bytes)
    )
    .map_err(|e| AuthError::Richtlinie(format!("Argon2-Parameter ungueltig: {e}")))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hasht ein Passwort mit Argon2id und einem zufaelligen Salt
///
/// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
pub fn passwort_hashen(passwort: &str, arbeitsfaktor: u32, speicher_kib: u32) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = argon2_instanz(arbeitsfaktor, speicher_kib)?;

    argon2
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::intern(format!("Passwort-Hashing fehlgeschlagen: {e}")))
}

/// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
///
/// Die Parameter kommen aus dem Hash selbst. Ein unlesbarer Hash gilt als
/// Nicht-Uebereinstimmung.
pub fn passwort_verifizieren(passwort: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(fehler = %e, "Gespeicherter Hash nicht lesbar");
            return false;
        }
    };

    match Argon2::default().verify_password(passwort.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            tracing::warn!(fehler = %e, "Hash-Verifikation fehlgeschlagen");
            false
        }
    }
}

/// Liest den Arbeitsfaktor aus einem PHC-String
pub fn arbeitsfaktor_auslesen(hash: &str) -> Option<u32> {
    let parsed = PasswordHash::new(hash).ok()?;
    Params::try_from(&parsed).ok().map(|p| p.t_cost())
}

/// Liefert einen neuen Hash, wenn der gespeicherte schwaecher als `ziel` ist
///
/// Nur nach erfolgreicher Verifikation aufrufen: das Klartext-Passwort wird
/// neu gehasht. Hashes mit gleichem oder hoeherem Faktor bleiben unveraendert.
pub fn eventuell_aufwerten(
    passwort: &str,
    hash: &str,
    ziel: u32,
    speicher_kib: u32,
) -> AuthResult<Option<String>> {
    match arbeitsfaktor_auslesen(hash) {
        Some(aktuell) if aktuell >= ziel => Ok(None),
        _ => passwort_hashen(passwort, ziel, speicher_kib).map(Some),
    }
}

/// Prueft ein Passwort gegen die Richtlinie
pub fn passwort_richtlinie_pruefen(
    passwort: &str,
    min_laenge: usize,
    buchstabe_und_ziffer: bool,
) -> AuthResult<()> {
    if passwort.chars().count() < min_laenge {
        return Err(AuthError::eingabe(format!(
            "Passwort zu kurz (min. {min_laenge} Zeichen)"
        )));
    }
    if buchstabe_und_ziffer {
        let hat_buchstabe = passwort.chars().any(|c| c.is_ascii_alphabetic());
        let hat_ziffer = passwort.chars().any(|c| c.is_ascii_digit());
        if !(hat_buchstabe && hat_ziffer) {
            return Err(AuthError::eingabe(
                "Passwort muss Buchstaben und Ziffern enthalten",
            ));
        }
    }
    Ok(())
}

async fn blockierend<T, F>(f: F) -> AuthResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AuthResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::intern(format!("Hash-Task abgebrochen: {e}")))?
}

/// [`passwort_hashen`] im Blocking-Pool
pub async fn passwort_hashen_blockierend(
    passwort: String,
    arbeitsfaktor: u32,
    speicher_kib: u32,
) -> AuthResult<String> {
    blockierend(move || passwort_hashen(&passwort, arbeitsfaktor, speicher_kib)).await
}

/// [`passwort_verifizieren`] im Blocking-Pool
pub async fn passwort_verifizieren_blockierend(passwort: String, hash: String) -> AuthResult<bool> {
    blockierend(move || Ok(passwort_verifizieren(&passwort, &hash))).await
}

/// [`eventuell_aufwerten`] im Blocking-Pool
pub async fn eventuell_aufwerten_blockierend(
    passwort: String,
    hash: String,
    ziel: u32,
    speicher_kib: u32,
) -> AuthResult<Option<String>> {
    blockierend(move || eventuell_aufwerten(&passwort, &hash, ziel, speicher_kib)).await
}
