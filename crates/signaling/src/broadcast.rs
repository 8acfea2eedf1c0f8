//! RoomBroadcaster – Zustellung an Raeume und einzelne Benutzer
//!
//! Der Broadcaster zieht sich fuer jede Zustellung eine Momentaufnahme
//! aus der Registry und schreibt nicht-blockierend in die Send-Queues.
//! Ein einzelner gestoerter Empfaenger (Queue voll oder geschlossen)
//! bricht die Zustellung an die uebrigen nie ab: er wird entfernt und
//! sein Austritt dem Raum angekuendigt.
//!
//! ## Reihenfolge
//! Zwei Broadcasts desselben Absenders in Programmreihenfolge kommen bei
//! jedem Empfaenger in derselben Reihenfolge an (FIFO pro Send-Queue).
//! Zwischen verschiedenen Absendern gibt es keine Ordnungsgarantie.

use chrono::Utc;
use rampenlicht_core::types::{RaumId, UserId, VerbindungsId};
use rampenlicht_protocol::ServerEnvelope;

use crate::registry::ConnectionRegistry;

/// Zustell-Schicht ueber der ConnectionRegistry
#[derive(Clone)]
pub struct RoomBroadcaster {
    registry: ConnectionRegistry,
}

impl RoomBroadcaster {
    /// Erstellt einen neuen Broadcaster ueber der gegebenen Registry
    pub fn neu(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Sendet einen Umschlag an alle Verbindungen eines Raums
    ///
    /// `ausser` schliesst optional eine Verbindung aus (typisch: den
    /// Absender, der seine eigene Nachricht lokal anzeigt). Gescheiterte
    /// Empfaenger werden entfernt und ihr Austritt angekuendigt. Gibt die
    /// Anzahl erfolgreicher Zustellungen zurueck.
    pub fn an_raum_senden(
        &self,
        raum_id: &RaumId,
        umschlag: ServerEnvelope,
        ausser: Option<VerbindungsId>,
    ) -> usize {
        let (gesendet, gescheitert) = self.zustellen(raum_id, umschlag, ausser);

        for verbindungs_id in gescheitert {
            self.verbindung_aufraeumen(verbindungs_id);
        }

        gesendet
    }

    /// Sendet einen Umschlag an genau eine Verbindung
    ///
    /// Bei Zustellfehler wird die Verbindung entfernt und `false`
    /// zurueckgegeben; der Aufrufer bekommt nie einen Fehler durchgereicht.
    pub fn direkt_senden(&self, verbindungs_id: VerbindungsId, umschlag: ServerEnvelope) -> bool {
        let client = match self.registry.verbindung(&verbindungs_id) {
            Some(client) => client,
            None => return false,
        };

        if client.senden(umschlag) {
            true
        } else {
            self.verbindung_aufraeumen(verbindungs_id);
            false
        }
    }

    /// Sendet einen Umschlag an die aktuelle Verbindung eines Benutzers
    ///
    /// `false` wenn der Benutzer keine lebende Verbindung hat: der
    /// Umschlag wird verworfen, nicht zwischengespeichert (kein
    /// Store-and-Forward fuer Offline-Benutzer).
    pub fn an_benutzer_senden(&self, user_id: &UserId, umschlag: ServerEnvelope) -> bool {
        match self.registry.verbindung_fuer_benutzer(user_id) {
            Some(client) => self.direkt_senden(client.verbindungs_id, umschlag),
            None => {
                tracing::debug!(user_id = %user_id, "Keine lebende Verbindung – Umschlag verworfen");
                false
            }
        }
    }

    /// Entfernt eine Verbindung und kuendigt ihren Austritt an
    ///
    /// Genau-einmal-Semantik: die Registry liefert die Verbindungsdaten
    /// nur dem ersten Aufrufer, nur der kuendigt an. Die Ankuendigung
    /// selbst laeuft ueber den rekursionsfreien Pfad: scheitert sie bei
    /// einem weiteren Empfaenger, wird der zwar entfernt, aber nicht
    /// erneut angekuendigt.
    pub fn verbindung_aufraeumen(&self, verbindungs_id: VerbindungsId) {
        let entfernt = match self.registry.entfernen(verbindungs_id) {
            Some(entfernt) => entfernt,
            None => return,
        };

        tracing::info!(
            user_id = %entfernt.identitaet.user_id,
            username = %entfernt.identitaet.username,
            raum = %entfernt.raum_id,
            "Verbindung nach Zustellfehler oder Trennung aufgeraeumt"
        );

        let abschied = ServerEnvelope::UserDisconnected {
            user_id: entfernt.identitaet.user_id,
            username: entfernt.identitaet.username,
            timestamp: Utc::now(),
        };

        // Best-effort: Fehler beim Abschied entfernen still, ohne weitere
        // Ankuendigungs-Kaskade
        let (_, gescheitert) = self.zustellen(&entfernt.raum_id, abschied, None);
        for id in gescheitert {
            if self.registry.entfernen(id).is_some() {
                tracing::debug!(
                    verbindung = %id,
                    "Verbindung beim Abschieds-Broadcast still entfernt"
                );
            }
        }
    }

    /// Gemeinsamer Zustellpfad: Momentaufnahme, try_send an alle,
    /// Rueckgabe von Erfolgszahl und gescheiterten Verbindungen
    fn zustellen(
        &self,
        raum_id: &RaumId,
        umschlag: ServerEnvelope,
        ausser: Option<VerbindungsId>,
    ) -> (usize, Vec<VerbindungsId>) {
        let schnappschuss = self.registry.verbindungen_im_raum(raum_id);

        let mut gesendet = 0;
        let mut gescheitert = Vec::new();

        for client in schnappschuss {
            if Some(client.verbindungs_id) == ausser {
                continue;
            }
            if client.senden(umschlag.clone()) {
                gesendet += 1;
            } else {
                gescheitert.push(client.verbindungs_id);
            }
        }

        (gesendet, gescheitert)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rampenlicht_core::types::{Identitaet, RaumId, Rolle, UserId};

    fn identitaet(name: &str) -> Identitaet {
        Identitaet {
            user_id: UserId::new(),
            username: name.to_string(),
            rolle: Rolle::Viewer,
        }
    }

    fn test_umschlag(text: &str) -> ServerEnvelope {
        ServerEnvelope::fehler(text)
    }

    #[tokio::test]
    async fn an_raum_senden_erreicht_alle() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let mut z1 = registry.zulassen(raum.clone(), identitaet("v1"));
        let mut z2 = registry.zulassen(raum.clone(), identitaet("v2"));

        let gesendet = broadcaster.an_raum_senden(&raum, test_umschlag("hallo"), None);
        assert_eq!(gesendet, 2);

        assert!(z1.empfaenger.try_recv().is_ok());
        assert!(z2.empfaenger.try_recv().is_ok());
    }

    #[tokio::test]
    async fn absender_wird_ausgeschlossen() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let mut z1 = registry.zulassen(raum.clone(), identitaet("v1"));
        let mut z2 = registry.zulassen(raum.clone(), identitaet("v2"));

        let gesendet =
            broadcaster.an_raum_senden(&raum, test_umschlag("x"), Some(z1.verbindungs_id));
        assert_eq!(gesendet, 1);

        assert!(z1.empfaenger.try_recv().is_err(), "Absender darf nichts empfangen");
        assert!(z2.empfaenger.try_recv().is_ok());
    }

    #[tokio::test]
    async fn gestoerter_empfaenger_wird_entfernt() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let mut z1 = registry.zulassen(raum.clone(), identitaet("v1"));
        let z2 = registry.zulassen(raum.clone(), identitaet("v2"));
        let mut z3 = registry.zulassen(raum.clone(), identitaet("v3"));

        // v2 simuliert einen toten Client: Empfangsseite schliessen
        drop(z2.empfaenger);

        let gesendet = broadcaster.an_raum_senden(&raum, test_umschlag("x"), None);
        assert_eq!(gesendet, 2, "Die uebrigen K-1 muessen erreicht werden");
        assert_eq!(registry.raum_benutzer_anzahl(&raum), 2);
        assert!(registry.verbindung(&z2.verbindungs_id).is_none());

        // Die Ueberlebenden bekommen Nachricht plus Abschieds-Ankuendigung
        assert!(z1.empfaenger.try_recv().is_ok());
        let abschied = z1.empfaenger.try_recv().expect("Abschied muss ankommen");
        assert!(matches!(abschied, ServerEnvelope::UserDisconnected { .. }));
        assert!(z3.empfaenger.try_recv().is_ok());
    }

    #[tokio::test]
    async fn abschied_feuert_nur_einmal() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let mut z1 = registry.zulassen(raum.clone(), identitaet("v1"));
        let z2 = registry.zulassen(raum.clone(), identitaet("v2"));
        drop(z2.empfaenger);

        broadcaster.verbindung_aufraeumen(z2.verbindungs_id);
        // Zweiter Aufraeum-Pfad (z.B. Read-Loop-Ende) laeuft ins Leere
        broadcaster.verbindung_aufraeumen(z2.verbindungs_id);

        let erste = z1.empfaenger.try_recv().expect("Ein Abschied muss ankommen");
        assert!(matches!(erste, ServerEnvelope::UserDisconnected { .. }));
        assert!(
            z1.empfaenger.try_recv().is_err(),
            "Abschied darf nicht doppelt ankommen"
        );
    }

    #[tokio::test]
    async fn direkt_senden_an_tote_verbindung() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let z1 = registry.zulassen(raum.clone(), identitaet("v1"));
        drop(z1.empfaenger);

        assert!(!broadcaster.direkt_senden(z1.verbindungs_id, test_umschlag("x")));
        assert!(registry.verbindung(&z1.verbindungs_id).is_none());
        // Nochmal: Verbindung existiert nicht mehr, immer noch false
        assert!(!broadcaster.direkt_senden(z1.verbindungs_id, test_umschlag("x")));
    }

    #[tokio::test]
    async fn an_benutzer_senden() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let benutzer = identitaet("v1");
        let user_id = benutzer.user_id;
        let mut zulassung = registry.zulassen(raum, benutzer);

        assert!(broadcaster.an_benutzer_senden(&user_id, test_umschlag("hi")));
        assert!(zulassung.empfaenger.try_recv().is_ok());

        // Offline-Benutzer: verworfen, kein Fehler
        assert!(!broadcaster.an_benutzer_senden(&UserId::new(), test_umschlag("hi")));
    }

    #[tokio::test]
    async fn reihenfolge_pro_empfaenger_bleibt_erhalten() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let mut zulassung = registry.zulassen(raum.clone(), identitaet("v1"));

        for i in 0..10 {
            broadcaster.an_raum_senden(&raum, test_umschlag(&format!("n{i}")), None);
        }

        for i in 0..10 {
            match zulassung.empfaenger.try_recv().unwrap() {
                ServerEnvelope::Error { message } => assert_eq!(message, format!("n{i}")),
                other => panic!("Unerwarteter Umschlag: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn voller_puffer_zaehlt_als_zustellfehler() {
        let registry = ConnectionRegistry::neu();
        let broadcaster = RoomBroadcaster::neu(registry.clone());
        let raum = RaumId::neu("r1");

        let zulassung = registry.zulassen(raum.clone(), identitaet("langsam"));

        // Queue (64) ohne Leser fluten; ab dann gilt der Empfaenger als gestoert
        let mut entfernt = false;
        for i in 0..=64 {
            broadcaster.an_raum_senden(&raum, test_umschlag(&format!("n{i}")), None);
            if registry.verbindung(&zulassung.verbindungs_id).is_none() {
                entfernt = true;
                break;
            }
        }

        assert!(entfernt, "Blockierter Empfaenger muss entfernt werden");
        assert_eq!(registry.raum_benutzer_anzahl(&raum), 0);
    }
}
