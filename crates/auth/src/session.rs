//! Session-Verwaltung fuer Rampenlicht
//!
//! Implementiert kurzlebige Session-Tokens fuer eingeloggte Benutzer.
//! Sessions werden im Speicher gehalten (in-memory HashMap mit TTL).
//! Ein Hintergrund-Task bereinigt abgelaufene Sessions automatisch.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rampenlicht_core::types::{Identitaet, Rolle, UserId};
use tokio::sync::RwLock;

use crate::error::{AuthError, AuthResult};

/// Standard-Session-Lebensdauer: 24 Stunden
const SESSION_TTL_SEKUNDEN: i64 = 24 * 60 * 60;

/// Intervall fuer den automatischen Cleanup-Task: 15 Minuten
const CLEANUP_INTERVALL: Duration = Duration::from_secs(15 * 60);

/// Loest ein Bearer-Token in eine Identitaet auf
///
/// Genau einmal pro Verbindungsversuch, vor der Zulassung. Der
/// Echtzeit-Kern haengt nur von diesem Trait ab, nicht vom konkreten
/// Session-Store.
#[async_trait]
pub trait IdentitaetsAufloeser: Send + Sync {
    async fn aufloesen(&self, token: &str) -> AuthResult<Identitaet>;
}

/// Ein aktives Session-Token
#[derive(Debug, Clone)]
pub struct Session {
    /// Der Token-String (URL-sicheres Base64)
    pub token: String,
    /// Identitaet des Benutzers dem diese Session gehoert
    pub identitaet: Identitaet,
    /// Zeitpunkt der Session-Erstellung
    pub erstellt_am: DateTime<Utc>,
    /// Zeitpunkt des Session-Ablaufs
    pub laeuft_ab_am: DateTime<Utc>,
}

impl Session {
    /// Gibt `true` zurueck wenn die Session noch gueltig ist
    pub fn ist_gueltig(&self) -> bool {
        Utc::now() < self.laeuft_ab_am
    }
}

/// In-Memory Session-Store mit TTL-Unterstuetzung
#[derive(Debug, Default)]
pub struct SessionStore {
    /// token -> Session
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Erstellt einen neuen leeren Session-Store
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Erstellt einen neuen Session-Store und startet den Cleanup-Task
    pub fn neu_mit_cleanup(store: Arc<Self>) -> Arc<Self> {
        let store_klon = Arc::clone(&store);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVALL).await;
                let entfernt = store_klon.cleanup_abgelaufene().await;
                if entfernt > 0 {
                    tracing::debug!(anzahl = entfernt, "Abgelaufene Sessions bereinigt");
                }
            }
        });
        store
    }

    /// Erstellt eine neue Session fuer die angegebene Identitaet
    ///
    /// Gibt die Session mit dem generierten Token zurueck.
    pub async fn erstellen(
        &self,
        user_id: UserId,
        username: &str,
        rolle: Rolle,
    ) -> AuthResult<Session> {
        let token = token_generieren();
        let jetzt = Utc::now();
        let session = Session {
            token: token.clone(),
            identitaet: Identitaet {
                user_id,
                username: username.to_string(),
                rolle,
            },
            erstellt_am: jetzt,
            laeuft_ab_am: jetzt + chrono::Duration::seconds(SESSION_TTL_SEKUNDEN),
        };

        self.sessions.write().await.insert(token, session.clone());
        tracing::debug!(user_id = %user_id, "Neue Session erstellt");
        Ok(session)
    }

    /// Validiert einen Session-Token und gibt die Session zurueck
    ///
    /// Gibt `AuthError::SessionUngueltig` zurueck wenn der Token nicht
    /// gefunden wurde, `AuthError::SessionAbgelaufen` bei Ablauf.
    pub async fn validieren(&self, token: &str) -> AuthResult<Session> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            None => Err(AuthError::SessionUngueltig),
            Some(session) if !session.ist_gueltig() => Err(AuthError::SessionAbgelaufen),
            Some(session) => Ok(session.clone()),
        }
    }

    /// Invalidiert (loescht) eine Session anhand des Tokens
    pub async fn invalidieren(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        tracing::debug!("Session invalidiert");
    }

    /// Bereinigt abgelaufene Sessions und gibt die Anzahl zurueck
    pub async fn cleanup_abgelaufene(&self) -> usize {
        let jetzt = Utc::now();
        let mut sessions = self.sessions.write().await;
        let vorher = sessions.len();
        sessions.retain(|_, s| s.laeuft_ab_am > jetzt);
        vorher - sessions.len()
    }

    /// Gibt die Anzahl der aktiven (nicht abgelaufenen) Sessions zurueck
    pub async fn anzahl_aktive(&self) -> usize {
        let jetzt = Utc::now();
        let sessions = self.sessions.read().await;
        sessions.values().filter(|s| s.laeuft_ab_am > jetzt).count()
    }
}

#[async_trait]
impl IdentitaetsAufloeser for SessionStore {
    async fn aufloesen(&self, token: &str) -> AuthResult<Identitaet> {
        Ok(self.validieren(token).await?.identitaet)
    }
}

/// Generiert einen kryptografisch sicheren Session-Token (URL-sicheres Base64)
fn token_generieren() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}
