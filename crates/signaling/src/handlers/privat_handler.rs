//! Privat-Handler – Direktnachrichten zwischen zwei Benutzern
//!
//! Der Raum-Schluessel ist deterministisch aus beiden User-IDs berechnet,
//! damit beide Richtungen einer Unterhaltung dieselbe History teilen.
//! Zustellung ist best-effort: ohne lebende Verbindung des Empfaengers
//! bleibt die Nachricht persistiert, wird aber nicht nachgereicht.

use rampenlicht_chat::NachrichtenTyp as DomainTyp;
use rampenlicht_core::types::UserId;
use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use rampenlicht_protocol::{privater_raum_schluessel, PrivatNachrichtInfo, ServerEnvelope};
use std::sync::Arc;

use crate::error::SignalingResult;
use crate::registry::RegistrierterClient;
use crate::server_state::SignalingState;

/// Verarbeitet eine private Nachricht an einen Benutzer
pub async fn handle_private_message<D>(
    recipient_id: UserId,
    content: &str,
    verbindung: &RegistrierterClient,
    state: &Arc<SignalingState<D>>,
) -> SignalingResult<()>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    let content = content.trim();
    if content.is_empty() {
        return Ok(());
    }

    let sender = &verbindung.identitaet;
    let raum_id = privater_raum_schluessel(sender.user_id, recipient_id);

    let nachricht = state
        .nachrichten
        .nachricht_senden(&raum_id, sender, content, DomainTyp::Private, None)
        .await?;

    let zugestellt = state.broadcaster.an_benutzer_senden(
        &recipient_id,
        ServerEnvelope::PrivateMessage {
            message: PrivatNachrichtInfo {
                id: nachricht.id,
                sender_id: sender.user_id,
                sender_username: sender.username.clone(),
                content: nachricht.content,
                created_at: nachricht.created_at,
            },
        },
    );

    tracing::debug!(
        von = %sender.user_id,
        an = %recipient_id,
        raum = %raum_id,
        zugestellt,
        "Private Nachricht verarbeitet"
    );

    Ok(())
}
