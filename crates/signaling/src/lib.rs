//! rampenlicht-signaling – Echtzeit-Verbindungs- und Raum-Kern
//!
//! Dieses Crate implementiert den Kern des Echtzeit-Dienstes: die
//! Verwaltung aller offenen WebSocket-Verbindungen, Raum-Broadcasts und
//! das Routing getypter Nachrichten (Chat, Tipp-Indikatoren, private
//! Nachrichten, Moderation, WebRTC-Signalisierung).
//!
//! ## Architektur
//!
//! ```text
//! WebSocket-Endpunkt (ws.rs, axum)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  State Machine: Verbindet -> Zugelassen -> Aktiv -> Geschlossen
//!     |
//!     v
//! SignalingRelay
//!     |
//!     +-- ChatHandler        (Chat-Nachrichten, Tips)
//!     +-- PrivatHandler      (private Nachrichten)
//!     +-- ModerationHandler  (Mute, Ban, Kick, Delete)
//!     +-- SignalHandler      (WebRTC Offer/Answer/ICE)
//!
//! ConnectionRegistry – Wer ist verbunden, in welchem Raum (Presence-Slot)
//! RoomBroadcaster    – Nachrichten an Raeume und einzelne Benutzer senden
//! ```

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod relay;
pub mod server_state;
pub mod ws;

// Bequeme Re-Exporte
pub use broadcast::RoomBroadcaster;
pub use connection::{ClientConnection, VerbindungsZustand};
pub use error::{SignalingError, SignalingResult};
pub use registry::{ConnectionRegistry, RegistrierterClient, Zulassung};
pub use relay::SignalingRelay;
pub use server_state::{SignalingConfig, SignalingState};
