//! Moderations-Handler – Mute, Ban, Kick, Nachricht loeschen
//!
//! Autorisierung laeuft bei jeder Aktion erneut, nie gecacht: Models
//! duerfen nur im Raum moderieren der ihrer eigenen Identitaet
//! entspricht, Admins ueberall. Nicht autorisierte Aktionen werden
//! still verworfen.
//!
//! Kick ist rein informativ: die Aktion wird protokolliert und
//! angekuendigt, die Zielverbindung aber nicht geschlossen. Erzwungenes
//! Trennen waere eine Erweiterung des RoomBroadcasters.

use rampenlicht_core::types::{RaumId, Rolle, UserId};
use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use rampenlicht_protocol::{AktionsTyp, ServerEnvelope};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::SignalingResult;
use crate::registry::RegistrierterClient;
use crate::server_state::SignalingState;

/// Verarbeitet eine Moderationsaktion
pub async fn handle_moderation_action<D>(
    target_user_id: UserId,
    action_type: AktionsTyp,
    duration_minutes: Option<i64>,
    reason: Option<&str>,
    message_id: Option<Uuid>,
    verbindung: &RegistrierterClient,
    state: &Arc<SignalingState<D>>,
) -> SignalingResult<()>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    let moderator = &verbindung.identitaet;
    let raum_id = &verbindung.raum_id;

    // Rollenpruefung: nur Models und Admins
    if !moderator.rolle.darf_moderieren() {
        tracing::debug!(
            user_id = %moderator.user_id,
            rolle = moderator.rolle.als_str(),
            "Moderationsaktion ohne Berechtigung verworfen"
        );
        return Ok(());
    }

    // Models nur im Raum ihrer eigenen Identitaet
    if moderator.rolle == Rolle::Model && *raum_id != RaumId::fuer_model(moderator.user_id) {
        tracing::debug!(
            user_id = %moderator.user_id,
            raum = %raum_id,
            "Moderationsaktion eines Models ausserhalb des eigenen Raums verworfen"
        );
        return Ok(());
    }

    state
        .moderation
        .aktion_anlegen(
            raum_id,
            moderator.user_id,
            target_user_id,
            action_type.als_str(),
            duration_minutes,
            reason,
            message_id,
        )
        .await?;

    match action_type {
        AktionsTyp::DeleteMessage => {
            let Some(message_id) = message_id else {
                tracing::debug!(
                    moderator = %moderator.user_id,
                    "delete_message ohne message_id – keine Loeschung"
                );
                return Ok(());
            };

            match state
                .nachrichten
                .nachricht_loeschen(message_id, moderator.user_id)
                .await
            {
                Ok(()) => {
                    state.broadcaster.an_raum_senden(
                        raum_id,
                        ServerEnvelope::MessageDeleted {
                            message_id,
                            deleted_by: moderator.username.clone(),
                        },
                        None,
                    );
                }
                Err(rampenlicht_chat::ChatError::NachrichtNichtGefunden(_)) => {
                    tracing::debug!(message_id = %message_id, "Zu loeschende Nachricht unbekannt");
                }
                Err(e) => return Err(e.into()),
            }
        }

        AktionsTyp::Mute | AktionsTyp::Ban | AktionsTyp::Kick => {
            state.broadcaster.an_raum_senden(
                raum_id,
                ServerEnvelope::ModerationAction {
                    action_type,
                    target_user_id,
                    moderator: moderator.username.clone(),
                    reason: reason.map(String::from),
                    duration_minutes,
                },
                None,
            );
        }
    }

    tracing::info!(
        moderator = %moderator.user_id,
        target = %target_user_id,
        aktion = action_type.als_str(),
        raum = %raum_id,
        "Moderationsaktion ausgefuehrt"
    );

    Ok(())
}
