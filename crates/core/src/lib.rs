//! rampenlicht-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Rampenlicht-Crates gemeinsam genutzt werden.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{RampenlichtError, Result};
pub use types::{Identitaet, RaumId, Rolle, UserId, VerbindungsId};
