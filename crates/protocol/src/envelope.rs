//! Nachrichten-Umschlaege (Client -> Server und Server -> Client)
//!
//! Jeder Umschlag ist ein JSON-Objekt mit `"type"`-Feld. Eingehende
//! Umschlaege werden genau einmal an der Verbindungsgrenze dekodiert;
//! String-basiertes Verzweigen auf rohen JSON-Schluesseln gibt es nicht.

use chrono::{DateTime, Utc};
use rampenlicht_core::types::{RaumId, Rolle, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Gemeinsame Typen
// ---------------------------------------------------------------------------

/// Nachrichtentyp einer Chat-Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NachrichtenTyp {
    Text,
    Tip,
    Private,
    System,
}

impl Default for NachrichtenTyp {
    fn default() -> Self {
        Self::Text
    }
}

/// Moderationsaktion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AktionsTyp {
    Mute,
    Ban,
    Kick,
    DeleteMessage,
}

impl AktionsTyp {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Mute => "mute",
            Self::Ban => "ban",
            Self::Kick => "kick",
            Self::DeleteMessage => "delete_message",
        }
    }

    /// Mute und Ban schraenken den Chat des Ziels ein, Kick und
    /// Delete-Message nicht.
    pub fn ist_einschraenkung(&self) -> bool {
        matches!(self, Self::Mute | Self::Ban)
    }
}

/// WebRTC-Signaltyp (nur Metadaten, keine Mediendaten)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalTyp {
    Offer,
    Answer,
    IceCandidate,
}

/// Ein Benutzer in der Online-Liste eines Raums
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaumBenutzer {
    pub user_id: UserId,
    pub username: String,
    pub role: Rolle,
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Alle vom Client akzeptierten Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEnvelope {
    /// Chat-Nachricht in den Raum der Verbindung
    ///
    /// `room_id` wird aus Kompatibilitaet zum Client-Payload akzeptiert,
    /// massgeblich ist immer der Raum an den die Verbindung gebunden ist.
    ChatMessage {
        #[serde(default)]
        room_id: Option<RaumId>,
        content: String,
        #[serde(default)]
        message_type: NachrichtenTyp,
        #[serde(default)]
        tip_amount: Option<i64>,
    },

    /// Tipp-Indikator (fluechtig, wird nie persistiert)
    Typing { is_typing: bool },

    /// Private Nachricht an einen bestimmten Benutzer
    PrivateMessage {
        recipient_id: UserId,
        content: String,
    },

    /// Moderationsaktion (nur Model im eigenen Raum oder Admin)
    ModerationAction {
        target_user_id: UserId,
        action_type: AktionsTyp,
        #[serde(default)]
        duration_minutes: Option<i64>,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        message_id: Option<Uuid>,
    },

    /// WebRTC-Signalisierung (Offer/Answer/ICE) an einen Benutzer
    Signal {
        signal_type: SignalTyp,
        target_user_id: UserId,
        payload: serde_json::Value,
    },
}

impl ClientEnvelope {
    /// Deserialisiert einen eingehenden Umschlag aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Vollstaendige Chat-Nachricht wie sie der Client anzeigt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatNachrichtInfo {
    pub id: Uuid,
    pub room_id: RaumId,
    pub sender_id: UserId,
    pub sender_username: String,
    pub sender_role: Rolle,
    pub message_type: NachrichtenTyp,
    pub content: String,
    pub tip_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Private Nachricht wie sie beim Empfaenger ankommt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivatNachrichtInfo {
    pub id: Uuid,
    pub sender_id: UserId,
    pub sender_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Alle vom Server versendeten Nachrichten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEnvelope {
    /// Chat-Nachricht an alle anderen im Raum
    ChatMessage { message: ChatNachrichtInfo },

    /// Tipp-Indikator eines anderen Benutzers
    Typing {
        user_id: UserId,
        username: String,
        is_typing: bool,
    },

    /// Private Nachricht (nur an den Empfaenger)
    PrivateMessage { message: PrivatNachrichtInfo },

    /// Ein Benutzer hat den Raum betreten
    UserConnected {
        user_id: UserId,
        username: String,
        timestamp: DateTime<Utc>,
    },

    /// Ein Benutzer hat den Raum verlassen
    UserDisconnected {
        user_id: UserId,
        username: String,
        timestamp: DateTime<Utc>,
    },

    /// Momentaufnahme aller Benutzer im Raum (bei Zulassung)
    OnlineUsers { users: Vec<RaumBenutzer> },

    /// Eine Nachricht wurde von der Moderation geloescht
    MessageDeleted {
        message_id: Uuid,
        deleted_by: String,
    },

    /// Moderationsereignis (Mute/Ban/Kick, rein informativ)
    ModerationAction {
        action_type: AktionsTyp,
        target_user_id: UserId,
        moderator: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        duration_minutes: Option<i64>,
    },

    /// Weitergeleitetes WebRTC-Signal
    Signal {
        signal_type: SignalTyp,
        sender_id: UserId,
        payload: serde_json::Value,
    },

    /// Fehler-Antwort an genau die ausloesende Verbindung
    Error { message: String },
}

impl ServerEnvelope {
    /// Erstellt eine Fehler-Antwort
    pub fn fehler(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
