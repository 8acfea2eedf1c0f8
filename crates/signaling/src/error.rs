//! Fehlertypen fuer den Signaling-Kern

use rampenlicht_auth::AuthError;
use rampenlicht_chat::ChatError;
use thiserror::Error;

/// Fehlertyp fuer den Signaling-Kern
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Authentifizierungsfehler (Verbindungsversuch wird abgelehnt)
    #[error("Authentifizierungsfehler: {0}")]
    Auth(#[from] AuthError),

    /// Eingehender Umschlag nicht dekodierbar
    #[error("Ungueltiger Umschlag: {0}")]
    UngueltigerUmschlag(String),

    /// Rollen- oder Eigentumspruefung fehlgeschlagen
    #[error("Zugriff verweigert: {0}")]
    ZugriffVerweigert(String),

    /// Senden an eine Verbindung fehlgeschlagen (Queue voll oder geschlossen)
    #[error("Zustellung fehlgeschlagen")]
    ZustellungFehlgeschlagen,

    /// Fehler aus den Chat-Diensten
    #[error("Chat-Fehler: {0}")]
    Chat(#[from] ChatError),

    /// Interner Fehler
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl SignalingError {
    /// Erstellt einen internen Fehler
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

/// Result-Typ fuer den Signaling-Kern
pub type SignalingResult<T> = Result<T, SignalingError>;
