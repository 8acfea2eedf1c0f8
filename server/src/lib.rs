//! rampenlicht-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und verdrahtet beim Start alle
//! Subsysteme: Datenbank, Session-Store, Chat-Dienste und den
//! Echtzeit-Kern hinter dem WebSocket-Endpunkt.

pub mod config;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Json};
use tower_http::trace::TraceLayer;

use rampenlicht_auth::SessionStore;
use rampenlicht_chat::{KontoService, ModerationService, NachrichtenService};
use rampenlicht_db::{repository::DatabaseConfig, SqliteDb};
use rampenlicht_signaling::{ws, SignalingConfig, SignalingState};

use config::ServerConfig;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbankverbindung herstellen, Migrationen ausfuehren
    /// 2. Session-Store und Chat-Dienste aufbauen
    /// 3. HTTP/WebSocket-Listener starten
    /// 4. Auf Ctrl-C / SIGTERM warten
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %self.config.bind_adresse(),
            "Server startet"
        );

        let db = Arc::new(
            SqliteDb::oeffnen(&DatabaseConfig {
                url: self.config.datenbank.url.clone(),
                max_verbindungen: self.config.datenbank.max_verbindungen,
                sqlite_wal: true,
            })
            .await?,
        );

        let sessions = SessionStore::neu_mit_cleanup(SessionStore::neu());

        let nachrichten = NachrichtenService::neu(Arc::clone(&db));
        let moderation = ModerationService::neu(Arc::clone(&db));
        ModerationService::cleanup_task_starten(Arc::clone(&moderation));
        let konto = KontoService::neu(Arc::clone(&db));

        let state = SignalingState::neu(
            SignalingConfig {
                max_verbindungen: self.config.server.max_verbindungen,
                history_limit: self.config.chat.history_limit,
            },
            sessions,
            nachrichten,
            moderation,
            konto,
        );

        let app = ws::router(state)
            .route("/health", get(health))
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(self.config.bind_adresse()).await?;
        tracing::info!(adresse = %listener.local_addr()?, "WebSocket-Endpunkt bereit");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Einfacher Health-Check fuer Load-Balancer und Monitoring
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Wartet auf Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %e, "Shutdown-Signal nicht verfuegbar");
    }
    tracing::info!("Shutdown-Signal empfangen");
}
