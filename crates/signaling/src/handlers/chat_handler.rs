//! Chat-Handler – Raum-Nachrichten und Tips
//!
//! Reihenfolge der Pruefungen folgt der Moderations-Politik: erst
//! Einschraenkung (stiller Drop), dann Guthaben (stiller Drop), dann
//! Persistenz, dann Broadcast. Der Absender wird vom Broadcast
//! ausgeschlossen und verlaesst sich auf sein lokales Echo.

use rampenlicht_chat::NachrichtenTyp as DomainTyp;
use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use rampenlicht_protocol::{NachrichtenTyp, ServerEnvelope};
use std::sync::Arc;

use crate::error::SignalingResult;
use crate::handlers::nachricht_info;
use crate::registry::RegistrierterClient;
use crate::server_state::SignalingState;

/// Verarbeitet eine Chat-Nachricht aus dem Raum der Verbindung
pub async fn handle_chat_message<D>(
    content: &str,
    message_type: NachrichtenTyp,
    tip_amount: Option<i64>,
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
    let raum_id = &verbindung.raum_id;

    // Moderations-Fakt pruefen: Mute/Ban verwirft still, ohne Rueckmeldung
    if state
        .moderation
        .ist_eingeschraenkt(raum_id, sender.user_id)
        .await?
    {
        tracing::debug!(
            user_id = %sender.user_id,
            raum = %raum_id,
            "Chat-Nachricht eines eingeschraenkten Benutzers verworfen"
        );
        return Ok(());
    }

    // Tip-Nachrichten verbuchen bevor irgendetwas persistiert wird;
    // unzureichendes Guthaben verwirft still (keine Teilverarbeitung)
    let (typ, tip_amount) = match (message_type, tip_amount) {
        (NachrichtenTyp::Tip, Some(betrag)) => {
            let verbucht = state
                .konto
                .tip_verbuchen(sender, raum_id, betrag, content)
                .await?;
            if !verbucht {
                tracing::debug!(
                    user_id = %sender.user_id,
                    betrag,
                    "Tip-Nachricht verworfen (Guthaben oder Raum ungueltig)"
                );
                return Ok(());
            }
            (DomainTyp::Tip, Some(betrag))
        }
        _ => (DomainTyp::Text, None),
    };

    let nachricht = state
        .nachrichten
        .nachricht_senden(raum_id, sender, content, typ, tip_amount)
        .await?;

    tracing::debug!(
        user_id = %sender.user_id,
        raum = %raum_id,
        message_id = %nachricht.id,
        "Chat-Nachricht gesendet"
    );

    state.broadcaster.an_raum_senden(
        raum_id,
        ServerEnvelope::ChatMessage {
            message: nachricht_info(nachricht),
        },
        Some(verbindung.verbindungs_id),
    );

    Ok(())
}
