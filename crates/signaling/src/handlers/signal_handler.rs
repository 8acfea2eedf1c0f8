//! Signal-Handler – WebRTC Offer/Answer/ICE-Relay
//!
//! Durch den Kern fliessen ausschliesslich Signalisierungs-Metadaten,
//! niemals Mediendaten. Signale werden direkt an die Zielverbindung
//! geroutet und nie persistiert; ist der Empfaenger offline, wird das
//! Signal verworfen.

use rampenlicht_core::types::UserId;
use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use rampenlicht_protocol::{ServerEnvelope, SignalTyp};
use std::sync::Arc;

use crate::error::SignalingResult;
use crate::registry::RegistrierterClient;
use crate::server_state::SignalingState;

/// Leitet ein WebRTC-Signal an die Zielverbindung weiter
pub async fn handle_signal<D>(
    signal_type: SignalTyp,
    target_user_id: UserId,
    payload: serde_json::Value,
    verbindung: &RegistrierterClient,
    state: &Arc<SignalingState<D>>,
) -> SignalingResult<()>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    let zugestellt = state.broadcaster.an_benutzer_senden(
        &target_user_id,
        ServerEnvelope::Signal {
            signal_type,
            sender_id: verbindung.identitaet.user_id,
            payload,
        },
    );

    if !zugestellt {
        tracing::debug!(
            von = %verbindung.identitaet.user_id,
            an = %target_user_id,
            signal = ?signal_type,
            "Signal verworfen: Empfaenger ohne lebende Verbindung"
        );
    }

    Ok(())
}
