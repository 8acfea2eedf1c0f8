//! WebSocket-Endpunkt – Upgrade, Authentifizierung, Task-Start
//!
//! Pro Verbindungsversuch wird das Bearer-Token genau einmal aufgeloest,
//! VOR dem Upgrade: eine gescheiterte Authentifizierung lehnt den
//! Versuch mit eigenem Status ab und erreicht die Registry nie. Nach dem
//! Upgrade laeuft jede Verbindung als eigener tokio-Task.

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rampenlicht_core::types::RaumId;
use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use serde::Deserialize;
use std::sync::Arc;

use crate::connection::ClientConnection;
use crate::server_state::SignalingState;

/// Query-Parameter des WebSocket-Endpunkts
#[derive(Debug, Deserialize)]
pub struct WsAuthAnfrage {
    /// Bearer-Token aus der Session-Ausgabe
    pub token: String,
}

/// Baut den Router fuer den Echtzeit-Dienst
pub fn router<D>(state: Arc<SignalingState<D>>) -> Router
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    Router::new()
        .route("/ws/chat/:raum_id", get(ws_chat_handler::<D>))
        .with_state(state)
}

/// WebSocket-Handler fuer `/ws/chat/:raum_id?token=...`
async fn ws_chat_handler<D>(
    ws: WebSocketUpgrade,
    Path(raum_id): Path<String>,
    Query(anfrage): Query<WsAuthAnfrage>,
    State(state): State<Arc<SignalingState<D>>>,
) -> Response
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    // Identitaet vor dem Upgrade aufloesen; Fehlschlag beendet den
    // Verbindungsversuch mit unterscheidbarem Status
    let identitaet = match state.auth.aufloesen(&anfrage.token).await {
        Ok(identitaet) => identitaet,
        Err(e) => {
            tracing::info!(raum = %raum_id, fehler = %e, "Verbindungsversuch abgelehnt");
            return (StatusCode::UNAUTHORIZED, "Authentifizierung fehlgeschlagen")
                .into_response();
        }
    };

    // Verbindungs-Limit
    let offen = state.registry.verbindungs_anzahl();
    if offen >= state.config.max_verbindungen as usize {
        tracing::warn!(
            offen,
            max = state.config.max_verbindungen,
            "Server voll – Verbindung abgelehnt"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Server voll").into_response();
    }

    let raum = RaumId::neu(raum_id);
    ws.on_upgrade(move |socket| async move {
        ClientConnection::neu(state, raum)
            .verarbeiten(socket, identitaet)
            .await;
    })
}
