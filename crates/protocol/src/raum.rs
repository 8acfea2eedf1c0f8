//! Raum-Schluessel-Berechnung
//!
//! Oeffentliche Raeume tragen die User-ID des Models als Schluessel.
//! Private Raeume verwenden einen deterministischen Paar-Schluessel, damit
//! beide Richtungen einer Unterhaltung im selben Raum landen.

use rampenlicht_core::types::{RaumId, UserId};

/// Praefix fuer private Raum-Schluessel
const PRIVAT_PRAEFIX: &str = "private";

/// Berechnet den Raum-Schluessel einer privaten Unterhaltung
///
/// Symmetrisch: `privater_raum_schluessel(a, b) == privater_raum_schluessel(b, a)`.
/// Die beiden IDs werden als Strings sortiert und mit `_` verbunden.
pub fn privater_raum_schluessel(a: UserId, b: UserId) -> RaumId {
    let (erster, zweiter) = if a.to_string() <= b.to_string() {
        (a, b)
    } else {
        (b, a)
    };
    RaumId::neu(format!("{PRIVAT_PRAEFIX}_{erster}_{zweiter}"))
}
