//! Gemeinsamer Server-Zustand fuer den Echtzeit-Dienst
//!
//! Haelt alle geteilten Dienste und Zustands-Manager als Arc-Referenzen,
//! die sicher zwischen tokio-Tasks geteilt werden koennen. Genau eine
//! Instanz pro Prozess; jede Verbindung bekommt ein Handle darauf.

use rampenlicht_auth::IdentitaetsAufloeser;
use rampenlicht_chat::{KontoService, ModerationService, NachrichtenService};
use rampenlicht_db::{ChatMessageRepository, KontoRepository, ModerationRepository};
use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::RoomBroadcaster;
use crate::registry::ConnectionRegistry;

/// Konfiguration fuer den Echtzeit-Dienst
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximale gleichzeitige Verbindungen
    pub max_verbindungen: u32,
    /// Anzahl der History-Nachrichten bei der Zulassung
    pub history_limit: i64,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            max_verbindungen: 2048,
            history_limit: 50,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
///
/// Alle Dienste sind als Arc gehalten. Clone gibt eine Referenz auf
/// denselben inneren Zustand.
pub struct SignalingState<D>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    /// Dienst-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Identitaetsaufloesung (Token -> Identitaet, vor der Zulassung)
    pub auth: Arc<dyn IdentitaetsAufloeser>,
    /// Nachrichten-Persistenz und History
    pub nachrichten: Arc<NachrichtenService<D>>,
    /// Moderations-Fakten und Aktions-Protokoll
    pub moderation: Arc<ModerationService<D>>,
    /// Token-Guthaben und Tip-Verbuchung
    pub konto: Arc<KontoService<D>>,
    /// Buchfuehrung aller offenen Verbindungen
    pub registry: ConnectionRegistry,
    /// Zustell-Schicht ueber der Registry
    pub broadcaster: RoomBroadcaster,
    /// Startzeitpunkt des Dienstes (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl<D> SignalingState<D>
where
    D: ChatMessageRepository + ModerationRepository + KontoRepository + 'static,
{
    /// Erstellt einen neuen SignalingState
    pub fn neu(
        config: SignalingConfig,
        auth: Arc<dyn IdentitaetsAufloeser>,
        nachrichten: Arc<NachrichtenService<D>>,
        moderation: Arc<ModerationService<D>>,
        konto: Arc<KontoService<D>>,
    ) -> Arc<Self> {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());

        Arc::new(Self {
            config: Arc::new(config),
            auth,
            nachrichten,
            moderation,
            konto,
            registry,
            broadcaster,
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
