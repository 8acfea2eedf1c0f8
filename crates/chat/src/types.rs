//! Oeffentliche Typen fuer die Chat-Dienste

use chrono::{DateTime, Utc};
use rampenlicht_core::types::{RaumId, Rolle, UserId};
use rampenlicht_db::models::{self, ChatNachrichtRecord};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nachrichtentyp (Domain-Ebene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NachrichtenTyp {
    Text,
    Tip,
    Private,
    System,
}

impl From<NachrichtenTyp> for models::NachrichtenTyp {
    fn from(typ: NachrichtenTyp) -> Self {
        match typ {
            NachrichtenTyp::Text => Self::Text,
            NachrichtenTyp::Tip => Self::Tip,
            NachrichtenTyp::Private => Self::Private,
            NachrichtenTyp::System => Self::System,
        }
    }
}

impl From<models::NachrichtenTyp> for NachrichtenTyp {
    fn from(typ: models::NachrichtenTyp) -> Self {
        match typ {
            models::NachrichtenTyp::Text => Self::Text,
            models::NachrichtenTyp::Tip => Self::Tip,
            models::NachrichtenTyp::Private => Self::Private,
            models::NachrichtenTyp::System => Self::System,
        }
    }
}

/// Eine Chat-Nachricht (Domain-Typ, nicht DB-Record)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatNachricht {
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

impl From<ChatNachrichtRecord> for ChatNachricht {
    fn from(record: ChatNachrichtRecord) -> Self {
        Self {
            id: record.id,
            room_id: RaumId::neu(record.room_id),
            sender_id: UserId(record.sender_id),
            sender_username: record.sender_username,
            sender_role: record.sender_role,
            message_type: record.message_type.into(),
            content: record.content,
            tip_amount: record.tip_amount,
            created_at: record.created_at,
        }
    }
}

/// Cursor-basierte Paginierung fuer die Nachrichten-History
#[derive(Debug, Clone, Default)]
pub struct HistoryAnfrage {
    pub room_id: RaumId,
    /// Lade Nachrichten vor diesem Zeitstempel
    pub before: Option<DateTime<Utc>>,
    /// Maximale Anzahl (Default: 50, Obergrenze: 100)
    pub limit: Option<i64>,
}

