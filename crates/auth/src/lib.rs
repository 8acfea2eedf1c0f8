//! rampenlicht-auth – Identitaetsaufloesung fuer den Echtzeit-Dienst
//!
//! Der Echtzeit-Kern kennt von der Authentifizierung nur eine schmale
//! Schnittstelle: ein Bearer-Token wird genau einmal pro
//! Verbindungsversuch in eine `Identitaet` aufgeloest. Token-Ausgabe,
//! Login und Rollenverwaltung gehoeren zur Benutzerverwaltung und sind
//! hier bewusst nicht abgebildet.

pub mod error;
pub mod session;

pub use error::{AuthError, AuthResult};
pub use session::{IdentitaetsAufloeser, Session, SessionStore};
