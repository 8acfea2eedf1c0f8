//! rampenlicht-chat – Chat-, Moderations- und Konto-Services
//!
//! Dieses Crate implementiert die Domain-Dienste auf die sich der
//! Echtzeit-Kern stuetzt:
//! - NachrichtenService: Nachrichten validieren, persistieren, History, Soft-Delete
//! - ModerationService: Mute/Ban-Fakten pruefen, Aktionen protokollieren
//! - KontoService: Guthaben pruefen, Tips mit Plattform-Gebuehr verbuchen
//!
//! Alle Dienste sind generisch ueber die Repository-Traits aus
//! `rampenlicht-db` und damit ohne Datenbank testbar.

pub mod error;
pub mod konto;
pub mod moderation;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{ChatError, ChatResult};
pub use konto::KontoService;
pub use moderation::ModerationService;
pub use service::NachrichtenService;
pub use types::{ChatNachricht, HistoryAnfrage, NachrichtenTyp};
