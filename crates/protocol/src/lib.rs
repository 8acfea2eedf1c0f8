//! rampenlicht-protocol – Wire-Protokoll des Echtzeit-Dienstes
//!
//! Definiert die getypten Nachrichten-Umschlaege die ueber die
//! WebSocket-Verbindung zwischen Client und Server ausgetauscht werden,
//! sowie die deterministische Raum-Schluessel-Berechnung.
//!
//! ## Design
//! - Tagged Enums fuer typsichere Nachrichtentypen (`"type"`-Feld im JSON)
//! - Eingehend (`ClientEnvelope`) und ausgehend (`ServerEnvelope`) getrennt:
//!   der Server akzeptiert niemals seine eigenen Ausgangs-Typen als Eingabe
//! - Unbekannte oder fehlerhafte Payloads schlagen beim Dekodieren fehl und
//!   werden an der Verbindungsgrenze als `MalformedEnvelope` behandelt

pub mod envelope;
pub mod raum;

pub use envelope::{
    AktionsTyp, ChatNachrichtInfo, ClientEnvelope, NachrichtenTyp, PrivatNachrichtInfo,
    RaumBenutzer, ServerEnvelope, SignalTyp,
};
pub use raum::privater_raum_schluessel;
