//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Dieser Task ist der einzige Ort der auf eingehende
//! Nachrichten dieser Verbindung reagiert; Zustellungen an andere
//! Verbindungen laufen ueber deren Send-Queues.
//!
//! ## State Machine
//! ```text
//! Verbindet -> Zugelassen -> Aktiv -> Geschlossen
//! ```
//! `Zugelassen` loest die Begruessung aus: juengste History, Online-Liste,
//! `user_connected` an den Rest des Raums. `Geschlossen` ist terminal und
//! raeumt genau einmal auf – auch wenn Read-Loop-Ende und ein
//! gleichzeitiger Broadcast-Fehler um das Aufraeumen konkurrieren.

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::{Sink, SinkExt, StreamExt};
use rampenlicht_core::types::{Identitaet, RaumId};
use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use rampenlicht_protocol::ServerEnvelope;
use std::sync::Arc;

use crate::error::SignalingResult;
use crate::handlers::nachricht_info;
use crate::relay::SignalingRelay;
use crate::server_state::SignalingState;

/// Zustand einer Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Handshake abgeschlossen, noch nicht in der Registry
    Verbindet,
    /// In der Registry, Begruessung laeuft
    Zugelassen,
    /// Nachrichten werden verarbeitet
    Aktiv,
    /// Terminal: Verbindung wird aufgeraeumt
    Geschlossen,
}

/// Verarbeitet eine einzelne WebSocket-Verbindung
///
/// Laeuft in einem eigenen tokio-Task bis der Client trennt, ein
/// Protokollfehler auftritt oder der Broadcaster die Verbindung wegen
/// Zustellfehlern entfernt.
pub struct ClientConnection<D>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    state: Arc<SignalingState<D>>,
    raum_id: RaumId,
}

impl<D> ClientConnection<D>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    /// Erstellt eine neue ClientConnection fuer einen Raum
    pub fn neu(state: Arc<SignalingState<D>>, raum_id: RaumId) -> Self {
        Self { state, raum_id }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    pub async fn verarbeiten(self, socket: WebSocket, identitaet: Identitaet) {
        let (mut sink, mut stream) = socket.split();
        let mut zustand = VerbindungsZustand::Verbindet;

        let user_id = identitaet.user_id;
        let username = identitaet.username.clone();
        tracing::trace!(user_id = %user_id, zustand = ?zustand, "Verbindungs-Task gestartet");

        let zulassung = self
            .state
            .registry
            .zulassen(self.raum_id.clone(), identitaet);
        let verbindungs_id = zulassung.verbindungs_id;
        let mut empfaenger = zulassung.empfaenger;
        zustand = VerbindungsZustand::Zugelassen;

        tracing::info!(
            user_id = %user_id,
            username = %username,
            raum = %self.raum_id,
            zustand = ?zustand,
            "Verbindung zugelassen"
        );

        // Begruessung: History und Online-Liste direkt an den neuen Client
        match self.begruessungs_umschlaege().await {
            Ok(umschlaege) => {
                for umschlag in umschlaege {
                    if !umschlag_senden(&mut sink, &umschlag).await {
                        self.state.broadcaster.verbindung_aufraeumen(verbindungs_id);
                        return;
                    }
                }
            }
            Err(e) => {
                // Ohne History weiterleben; die Verbindung bleibt brauchbar
                tracing::warn!(
                    raum = %self.raum_id,
                    fehler = %e,
                    "Begruessung fehlgeschlagen, Verbindung laeuft ohne History weiter"
                );
            }
        }

        // Eintritt dem Rest des Raums ankuendigen
        self.state.broadcaster.an_raum_senden(
            &self.raum_id,
            ServerEnvelope::UserConnected {
                user_id,
                username: username.clone(),
                timestamp: Utc::now(),
            },
            Some(verbindungs_id),
        );

        zustand = VerbindungsZustand::Aktiv;
        tracing::debug!(user_id = %user_id, zustand = ?zustand, "Verbindung aktiv");
        let relay = SignalingRelay::neu(Arc::clone(&self.state));

        loop {
            tokio::select! {
                // Ausgehender Umschlag aus der Send-Queue
                ausgehend = empfaenger.recv() => {
                    match ausgehend {
                        Some(umschlag) => {
                            if !umschlag_senden(&mut sink, &umschlag).await {
                                break;
                            }
                        }
                        // Registry hat die Verbindung bereits entfernt
                        // (Zustellfehler oder Verdraengung durch neue Zulassung)
                        None => break,
                    }
                }

                // Eingehende Nachricht vom Client
                eingehend = stream.next() => {
                    match eingehend {
                        Some(Ok(Message::Text(text))) => {
                            let verbindung =
                                match self.state.registry.verbindung(&verbindungs_id) {
                                    Some(verbindung) => verbindung,
                                    None => break,
                                };

                            if let Some(fehler) = relay.verarbeiten(&text, &verbindung).await {
                                self.state.broadcaster.direkt_senden(verbindungs_id, fehler);
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(user_id = %user_id, "Verbindung vom Client getrennt");
                            break;
                        }
                        // Ping/Pong beantwortet die WebSocket-Schicht,
                        // Binaer-Frames kennt das Protokoll nicht
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(user_id = %user_id, fehler = %e, "WebSocket-Lesefehler");
                            break;
                        }
                    }
                }
            }
        }

        zustand = VerbindungsZustand::Geschlossen;
        tracing::debug!(
            user_id = %user_id,
            verbindung = %verbindungs_id,
            zustand = ?zustand,
            "Verbindungs-Task endet"
        );

        // Idempotent: raeumt auf und kuendigt den Austritt genau einmal an
        self.state.broadcaster.verbindung_aufraeumen(verbindungs_id);
    }

    /// Baut die Begruessungs-Umschlaege fuer eine frisch zugelassene
    /// Verbindung: juengste History (chronologisch), danach die
    /// Online-Liste des Raums
    pub async fn begruessungs_umschlaege(&self) -> SignalingResult<Vec<ServerEnvelope>> {
        let history = self
            .state
            .nachrichten
            .history_laden(rampenlicht_chat::HistoryAnfrage {
                room_id: self.raum_id.clone(),
                before: None,
                limit: Some(self.state.config.history_limit),
            })
            .await?;

        let mut umschlaege: Vec<ServerEnvelope> = history
            .into_iter()
            .map(|nachricht| ServerEnvelope::ChatMessage {
                message: nachricht_info(nachricht),
            })
            .collect();

        umschlaege.push(ServerEnvelope::OnlineUsers {
            users: self.state.registry.raum_benutzer(&self.raum_id),
        });

        Ok(umschlaege)
    }
}

/// Serialisiert einen Umschlag und schreibt ihn auf den WebSocket
///
/// Gibt `false` zurueck wenn der Socket nicht mehr schreibbar ist.
async fn umschlag_senden(
    sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
    umschlag: &ServerEnvelope,
) -> bool {
    let json = match umschlag.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(fehler = %e, "Umschlag nicht serialisierbar");
            return true;
        }
    };

    match sink.send(Message::Text(json)).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(fehler = %e, "WebSocket-Schreibfehler");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
