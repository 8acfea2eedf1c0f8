//! SignalingRelay – Routing eingehender Umschlaege
//!
//! Das Relay dekodiert jeden eingehenden Text-Frame genau einmal in einen
//! getypten Umschlag und verteilt ihn an den passenden Handler. Fehler
//! bleiben an der Nachrichtengrenze: ein nicht dekodierbarer oder intern
//! gescheiterter Umschlag erzeugt genau eine Fehler-Antwort an die
//! ausloesende Verbindung und beruehrt weder die Verbindung selbst noch
//! andere anstehende Nachrichten.

use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use rampenlicht_protocol::{ClientEnvelope, ServerEnvelope};
use std::sync::Arc;

use crate::error::SignalingResult;
use crate::handlers::{chat_handler, moderation_handler, privat_handler, signal_handler};
use crate::registry::RegistrierterClient;
use crate::server_state::SignalingState;

/// Zentrales Relay fuer eine Verbindung im Zustand `Aktiv`
pub struct SignalingRelay<D>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    state: Arc<SignalingState<D>>,
}

impl<D> SignalingRelay<D>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    /// Erstellt ein neues Relay
    pub fn neu(state: Arc<SignalingState<D>>) -> Self {
        Self { state }
    }

    /// Verarbeitet einen eingehenden Text-Frame
    ///
    /// Gibt `Some(umschlag)` zurueck wenn eine Fehler-Antwort an die
    /// ausloesende Verbindung gehen soll, sonst `None`.
    pub async fn verarbeiten(
        &self,
        text: &str,
        verbindung: &RegistrierterClient,
    ) -> Option<ServerEnvelope> {
        let umschlag = match ClientEnvelope::from_json(text) {
            Ok(umschlag) => umschlag,
            Err(e) => {
                tracing::debug!(
                    user_id = %verbindung.identitaet.user_id,
                    fehler = %e,
                    "Eingehender Umschlag nicht dekodierbar"
                );
                return Some(ServerEnvelope::fehler("Ungueltiges Nachrichtenformat"));
            }
        };

        match self.dispatch(umschlag, verbindung).await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(
                    user_id = %verbindung.identitaet.user_id,
                    fehler = %e,
                    "Fehler bei der Verarbeitung eines Umschlags"
                );
                Some(ServerEnvelope::fehler(
                    "Fehler bei der Verarbeitung der Nachricht",
                ))
            }
        }
    }

    /// Routet einen dekodierten Umschlag an den passenden Handler
    async fn dispatch(
        &self,
        umschlag: ClientEnvelope,
        verbindung: &RegistrierterClient,
    ) -> SignalingResult<()> {
        match umschlag {
            ClientEnvelope::ChatMessage {
                content,
                message_type,
                tip_amount,
                // Massgeblich ist der Raum der Verbindung, nicht das Payload-Feld
                room_id: _,
            } => {
                chat_handler::handle_chat_message(
                    &content,
                    message_type,
                    tip_amount,
                    verbindung,
                    &self.state,
                )
                .await
            }

            ClientEnvelope::Typing { is_typing } => {
                // Fluechtig: keine Autorisierung, keine Persistenz
                self.state.broadcaster.an_raum_senden(
                    &verbindung.raum_id,
                    ServerEnvelope::Typing {
                        user_id: verbindung.identitaet.user_id,
                        username: verbindung.identitaet.username.clone(),
                        is_typing,
                    },
                    Some(verbindung.verbindungs_id),
                );
                Ok(())
            }

            ClientEnvelope::PrivateMessage {
                recipient_id,
                content,
            } => {
                privat_handler::handle_private_message(
                    recipient_id,
                    &content,
                    verbindung,
                    &self.state,
                )
                .await
            }

            ClientEnvelope::ModerationAction {
                target_user_id,
                action_type,
                duration_minutes,
                reason,
                message_id,
            } => {
                moderation_handler::handle_moderation_action(
                    target_user_id,
                    action_type,
                    duration_minutes,
                    reason.as_deref(),
                    message_id,
                    verbindung,
                    &self.state,
                )
                .await
            }

            ClientEnvelope::Signal {
                signal_type,
                target_user_id,
                payload,
            } => {
                signal_handler::handle_signal(
                    signal_type,
                    target_user_id,
                    payload,
                    verbindung,
                    &self.state,
                )
                .await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
