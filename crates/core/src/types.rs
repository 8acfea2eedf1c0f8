//! Gemeinsame Identifikations- und Identitaetstypen fuer Rampenlicht
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen. Raum-Schluessel
//! sind bewusst opake Strings: oeffentliche Raeume tragen die Model-ID,
//! private Raeume einen deterministischen Paar-Schluessel.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Benutzer-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Erstellt eine neue zufaellige UserId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Eindeutige Verbindungs-ID
///
/// Identifiziert genau eine offene WebSocket-Verbindung. Ein Benutzer kann
/// ueber die Lebensdauer des Servers viele Verbindungs-IDs verbrauchen,
/// haelt aber zu jedem Zeitpunkt hoechstens einen Presence-Slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbindungsId(pub Uuid);

impl VerbindungsId {
    /// Erstellt eine neue zufaellige VerbindungsId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VerbindungsId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Opaker Raum-Schluessel
///
/// Oeffentliche Chat-Raeume: die User-ID des Models als String.
/// Private Raeume: `private_{a}_{b}` mit sortiertem ID-Paar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaumId(pub String);

impl RaumId {
    /// Erstellt einen Raum-Schluessel aus einem beliebigen String
    pub fn neu(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Oeffentlicher Raum eines Models (Raum-Schluessel == Model-User-ID)
    pub fn fuer_model(model_id: UserId) -> Self {
        Self(model_id.to_string())
    }

    /// Gibt den inneren Schluessel zurueck
    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl Default for RaumId {
    fn default() -> Self {
        Self(String::new())
    }
}

impl std::fmt::Display for RaumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raum:{}", self.0)
    }
}

impl From<&str> for RaumId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Benutzerrolle auf der Plattform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rolle {
    Viewer,
    Model,
    Admin,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Model => "model",
            Self::Admin => "admin",
        }
    }

    /// Darf diese Rolle Moderationsaktionen ausfuehren?
    pub fn darf_moderieren(&self) -> bool {
        matches!(self, Self::Model | Self::Admin)
    }
}

impl std::str::FromStr for Rolle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "model" => Ok(Self::Model),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unbekannte Rolle: {other}")),
        }
    }
}

/// Aufgeloeste Identitaet einer Verbindung
///
/// Wird vom Auth-Kollaborateur vor der Zulassung geliefert und danach
/// unveraendert an der Verbindung gehalten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identitaet {
    pub user_id: UserId,
    pub username: String,
    pub rolle: Rolle,
}
