//! Handler fuer die einzelnen Nachrichtentypen des Relays

pub mod chat_handler;
pub mod moderation_handler;
pub mod privat_handler;
pub mod signal_handler;

use rampenlicht_chat::ChatNachricht;
use rampenlicht_protocol::{ChatNachrichtInfo, NachrichtenTyp};

/// Konvertiert eine Domain-Nachricht in den Wire-Umschlag-Inhalt
pub(crate) fn nachricht_info(nachricht: ChatNachricht) -> ChatNachrichtInfo {
    ChatNachrichtInfo {
        id: nachricht.id,
        room_id: nachricht.room_id,
        sender_id: nachricht.sender_id,
        sender_username: nachricht.sender_username,
        sender_role: nachricht.sender_role,
        message_type: nachrichten_typ(nachricht.message_type),
        content: nachricht.content,
        tip_amount: nachricht.tip_amount,
        created_at: nachricht.created_at,
    }
}

/// Domain-Nachrichtentyp -> Wire-Nachrichtentyp
pub(crate) fn nachrichten_typ(typ: rampenlicht_chat::NachrichtenTyp) -> NachrichtenTyp {
    match typ {
        rampenlicht_chat::NachrichtenTyp::Text => NachrichtenTyp::Text,
        rampenlicht_chat::NachrichtenTyp::Tip => NachrichtenTyp::Tip,
        rampenlicht_chat::NachrichtenTyp::Private => NachrichtenTyp::Private,
        rampenlicht_chat::NachrichtenTyp::System => NachrichtenTyp::System,
    }
}
