//! Datenbankmodelle fuer Rampenlicht
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank. Sie sind von
//! den Domain- und Protokoll-Typen getrennt und dienen als reine
//! Datenuebertragungsobjekte.

use chrono::{DateTime, Utc};
use rampenlicht_core::types::Rolle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Chat-Nachrichten
// ---------------------------------------------------------------------------

/// Nachrichtentyp auf Datenbank-Ebene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NachrichtenTyp {
    Text,
    Tip,
    Private,
    System,
}

impl NachrichtenTyp {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Tip => "tip",
            Self::Private => "private",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for NachrichtenTyp {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "tip" => Ok(Self::Tip),
            "private" => Ok(Self::Private),
            "system" => Ok(Self::System),
            other => Err(format!("Unbekannter Nachrichtentyp: {other}")),
        }
    }
}

/// Chat-Nachricht-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatNachrichtRecord {
    pub id: Uuid,
    pub room_id: String,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub sender_role: Rolle,
    pub message_type: NachrichtenTyp,
    pub content: String,
    pub tip_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl ChatNachrichtRecord {
    /// Weich geloeschte Nachrichten bleiben als Tombstone erhalten
    pub fn ist_geloescht(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Daten zum Erstellen einer neuen Nachricht
#[derive(Debug, Clone)]
pub struct NeueNachricht<'a> {
    pub room_id: &'a str,
    pub sender_id: Uuid,
    pub sender_username: &'a str,
    pub sender_role: Rolle,
    pub message_type: NachrichtenTyp,
    pub content: &'a str,
    pub tip_amount: Option<i64>,
}

/// Cursor-basierte Abfrage der Nachrichten-History
#[derive(Debug, Clone, Default)]
pub struct NachrichtenFilter {
    pub room_id: String,
    /// Lade Nachrichten vor diesem Zeitstempel
    pub before: Option<DateTime<Utc>>,
    /// Maximale Anzahl (Default: 50, Obergrenze: 100)
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

/// Moderationsaktion-Datensatz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationsRecord {
    pub id: Uuid,
    pub room_id: String,
    pub moderator_id: Uuid,
    pub target_user_id: Uuid,
    pub action_type: String,
    pub duration_minutes: Option<i64>,
    pub reason: Option<String>,
    pub message_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen einer Moderationsaktion
#[derive(Debug, Clone)]
pub struct NeueModerationsAktion<'a> {
    pub room_id: &'a str,
    pub moderator_id: Uuid,
    pub target_user_id: Uuid,
    pub action_type: &'a str,
    pub duration_minutes: Option<i64>,
    pub reason: Option<&'a str>,
    pub message_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Konten & Transaktionen
// ---------------------------------------------------------------------------

/// Token-Konto eines Benutzers
///
/// Viewer verbrauchen `token_balance`, Models sammeln `total_earnings` und
/// `available_balance`. Beide Seiten teilen sich einen Datensatz pro Benutzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KontoRecord {
    pub user_id: Uuid,
    pub token_balance: i64,
    pub total_spent: i64,
    pub total_earnings: i64,
    pub available_balance: i64,
    pub updated_at: DateTime<Utc>,
}

/// Transaktionsart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransaktionsTyp {
    Tip,
    Earning,
}

impl TransaktionsTyp {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Earning => "earning",
        }
    }
}

impl std::str::FromStr for TransaktionsTyp {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tip" => Ok(Self::Tip),
            "earning" => Ok(Self::Earning),
            other => Err(format!("Unbekannter Transaktionstyp: {other}")),
        }
    }
}

/// Transaktions-Datensatz (Tip-Abbuchung bzw. Model-Gutschrift)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransaktionsRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: TransaktionsTyp,
    pub tokens: i64,
    pub model_room_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen einer Transaktion
#[derive(Debug, Clone)]
pub struct NeueTransaktion<'a> {
    pub user_id: Uuid,
    pub transaction_type: TransaktionsTyp,
    pub tokens: i64,
    pub model_room_id: Option<&'a str>,
    pub description: Option<&'a str>,
}
