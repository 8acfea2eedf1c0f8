//! ConnectionRegistry – Buchfuehrung aller offenen Verbindungen
//!
//! Die Registry ist der einzige Ort der weiss welche Verbindungen
//! existieren, zu welchem Raum jede gehoert und welche Verbindung den
//! Presence-Slot eines Benutzers haelt. Alle Abbildungen liegen in
//! DashMaps; kein Aufrufer braucht externe Synchronisierung.
//!
//! ## Invarianten
//! - Ein Raum-Eintrag enthaelt nie eine leere Mitgliederliste: der letzte
//!   Austritt loescht den Eintrag.
//! - Pro Benutzer ist hoechstens eine Verbindung ueber den Presence-Slot
//!   aufloesbar; eine neue Zulassung verdraengt die alte Verbindung
//!   (last-connection-wins) aus Slot UND Raum.
//! - `entfernen` ist idempotent und liefert die Verbindungsdaten nur dem
//!   ersten Aufrufer; damit feuert die Abschieds-Ankuendigung genau einmal,
//!   auch wenn Read-Loop-Ende und Broadcast-Cleanup gleichzeitig aufraeumen.
//!
//! Buchfuehrung ist von der Zustell-Latenz entkoppelt: alle Operationen
//! sind reine Map-Mutationen und blockieren nie auf fremdem I/O.

use dashmap::DashMap;
use rampenlicht_core::types::{Identitaet, RaumId, UserId, VerbindungsId};
use rampenlicht_protocol::{RaumBenutzer, ServerEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Groesse der Send-Queue pro Verbindung
const SENDE_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer verbundenen Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    tx: mpsc::Sender<ServerEnvelope>,
}

impl ClientSender {
    /// Sendet einen Umschlag nicht-blockierend an die Verbindung
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    /// Ein voller Puffer zaehlt als Zustellfehler: ein blockierter
    /// Empfaenger darf nicht den ganzen Raum stauen.
    pub fn senden(&self, umschlag: ServerEnvelope) -> bool {
        match self.tx.try_send(umschlag) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Send-Queue voll – Verbindung gilt als gestoert");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Registrierte Verbindung
// ---------------------------------------------------------------------------

/// Eine in der Registry gefuehrte Verbindung
///
/// Clone ist billig (Arc-artige Handles); die Registry bleibt alleinige
/// Eigentuemerin der Zuordnungen Verbindung->Raum und Benutzer->Verbindung.
#[derive(Clone, Debug)]
pub struct RegistrierterClient {
    pub verbindungs_id: VerbindungsId,
    pub identitaet: Identitaet,
    pub raum_id: RaumId,
    sender: ClientSender,
}

impl RegistrierterClient {
    /// Sendet einen Umschlag nicht-blockierend an diese Verbindung
    pub fn senden(&self, umschlag: ServerEnvelope) -> bool {
        self.sender.senden(umschlag)
    }
}

/// Ergebnis einer Zulassung
pub struct Zulassung {
    /// ID der neuen Verbindung
    pub verbindungs_id: VerbindungsId,
    /// Empfangsseite der Send-Queue; der Verbindungs-Task liest hieraus
    /// und schreibt auf den WebSocket
    pub empfaenger: mpsc::Receiver<ServerEnvelope>,
    /// Verbindung die durch last-connection-wins verdraengt wurde
    pub ersetzt: Option<VerbindungsId>,
}

/// Daten einer entfernten Verbindung (nur der erste `entfernen`-Aufrufer
/// bekommt sie)
#[derive(Debug, Clone)]
pub struct EntfernterClient {
    pub verbindungs_id: VerbindungsId,
    pub identitaet: Identitaet,
    pub raum_id: RaumId,
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Zentrale Buchfuehrung aller Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<ConnectionRegistryInner>,
}

struct ConnectionRegistryInner {
    /// Alle offenen Verbindungen, indiziert nach VerbindungsId
    verbindungen: DashMap<VerbindungsId, RegistrierterClient>,
    /// Raum -> Liste der Verbindungs-IDs in diesem Raum
    raum_mitglieder: DashMap<RaumId, Vec<VerbindungsId>>,
    /// Presence-Slot: Benutzer -> aktuelle Verbindung
    praesenz: DashMap<UserId, VerbindungsId>,
}

impl ConnectionRegistry {
    /// Erstellt eine neue, leere Registry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(ConnectionRegistryInner {
                verbindungen: DashMap::new(),
                raum_mitglieder: DashMap::new(),
                praesenz: DashMap::new(),
            }),
        }
    }

    /// Laesst eine fertig ausgehandelte Verbindung zu
    ///
    /// Der Handshake (WebSocket-Upgrade, Token-Aufloesung) ist zu diesem
    /// Zeitpunkt abgeschlossen. Die Operation blockiert nie und schlaegt
    /// nie fehl. Haelt der Benutzer bereits einen Presence-Slot, wird die
    /// alte Verbindung sofort aus Slot und Raum verdraengt – geschlossen
    /// wird sie vom Aufrufer bzw. ihrem eigenen Task, nicht hier.
    pub fn zulassen(&self, raum_id: RaumId, identitaet: Identitaet) -> Zulassung {
        let verbindungs_id = VerbindungsId::new();
        let user_id = identitaet.user_id;
        let (tx, rx) = mpsc::channel(SENDE_QUEUE_GROESSE);

        let client = RegistrierterClient {
            verbindungs_id,
            identitaet,
            raum_id: raum_id.clone(),
            sender: ClientSender { tx },
        };

        self.inner.verbindungen.insert(verbindungs_id, client);
        self.inner
            .raum_mitglieder
            .entry(raum_id.clone())
            .or_default()
            .push(verbindungs_id);

        // Presence-Slot: last-connection-wins
        let ersetzt = self.inner.praesenz.insert(user_id, verbindungs_id);

        if let Some(alte_id) = ersetzt {
            // Alte Verbindung still aus Registry und Raum verdraengen;
            // ihr Read-Loop-Cleanup laeuft spaeter ins Leere (idempotent)
            if let Some((_, alter_client)) = self.inner.verbindungen.remove(&alte_id) {
                self.aus_raum_austragen(&alte_id, &alter_client.raum_id);
                tracing::debug!(
                    user_id = %user_id,
                    alte_verbindung = %alte_id,
                    "Vorherige Verbindung durch neue Zulassung verdraengt"
                );
            }
        }

        tracing::debug!(
            user_id = %user_id,
            verbindung = %verbindungs_id,
            raum = %raum_id,
            "Verbindung zugelassen"
        );

        Zulassung {
            verbindungs_id,
            empfaenger: rx,
            ersetzt,
        }
    }

    /// Entfernt eine Verbindung aus Raum und Presence-Slot
    ///
    /// Idempotent: nur der erste Aufrufer erhaelt die Verbindungsdaten,
    /// jeder weitere Aufruf ist ein No-Op. Der Presence-Slot wird nur
    /// geloescht wenn er noch auf genau diese Verbindung zeigt.
    pub fn entfernen(&self, verbindungs_id: VerbindungsId) -> Option<EntfernterClient> {
        let (_, client) = self.inner.verbindungen.remove(&verbindungs_id)?;

        self.aus_raum_austragen(&verbindungs_id, &client.raum_id);
        self.inner
            .praesenz
            .remove_if(&client.identitaet.user_id, |_, aktuelle| {
                *aktuelle == verbindungs_id
            });

        tracing::debug!(
            user_id = %client.identitaet.user_id,
            verbindung = %verbindungs_id,
            raum = %client.raum_id,
            "Verbindung entfernt"
        );

        Some(EntfernterClient {
            verbindungs_id,
            identitaet: client.identitaet,
            raum_id: client.raum_id,
        })
    }

    /// Punktuelle Momentaufnahme aller Verbindungen eines Raums
    ///
    /// Die zurueckgegebene Liste ist eine Kopie; gleichzeitige
    /// Zulassungen oder Entfernungen veraendern sie nicht mehr.
    pub fn verbindungen_im_raum(&self, raum_id: &RaumId) -> Vec<RegistrierterClient> {
        let ids = match self.inner.raum_mitglieder.get(raum_id) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };

        ids.iter()
            .filter_map(|id| self.inner.verbindungen.get(id).map(|c| c.clone()))
            .collect()
    }

    /// Gibt die aktuelle Verbindung eines Benutzers zurueck (Presence-Slot)
    pub fn verbindung_fuer_benutzer(&self, user_id: &UserId) -> Option<RegistrierterClient> {
        let verbindungs_id = *self.inner.praesenz.get(user_id)?;
        self.inner
            .verbindungen
            .get(&verbindungs_id)
            .map(|c| c.clone())
    }

    /// Gibt eine Verbindung anhand ihrer ID zurueck
    pub fn verbindung(&self, verbindungs_id: &VerbindungsId) -> Option<RegistrierterClient> {
        self.inner
            .verbindungen
            .get(verbindungs_id)
            .map(|c| c.clone())
    }

    /// Anzahl der Benutzer in einem Raum
    pub fn raum_benutzer_anzahl(&self, raum_id: &RaumId) -> usize {
        self.inner
            .raum_mitglieder
            .get(raum_id)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }

    /// Benutzerliste eines Raums (fuer die Online-Momentaufnahme)
    pub fn raum_benutzer(&self, raum_id: &RaumId) -> Vec<RaumBenutzer> {
        self.verbindungen_im_raum(raum_id)
            .into_iter()
            .map(|c| RaumBenutzer {
                user_id: c.identitaet.user_id,
                username: c.identitaet.username,
                role: c.identitaet.rolle,
            })
            .collect()
    }

    /// Gesamtzahl offener Verbindungen
    pub fn verbindungs_anzahl(&self) -> usize {
        self.inner.verbindungen.len()
    }

    /// Prueft ob ein Raum-Eintrag existiert
    pub fn raum_existiert(&self, raum_id: &RaumId) -> bool {
        self.inner.raum_mitglieder.contains_key(raum_id)
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    /// Traegt eine Verbindung aus der Mitgliederliste ihres Raums aus und
    /// loescht den Raum-Eintrag falls er dadurch leer wird. Das Pruefen
    /// auf Leere laeuft unter der Shard-Sperre (`remove_if`), damit ein
    /// gleichzeitiger Beitritt keinen frisch gefuellten Eintrag verliert.
    fn aus_raum_austragen(&self, verbindungs_id: &VerbindungsId, raum_id: &RaumId) {
        if let Some(mut ids) = self.inner.raum_mitglieder.get_mut(raum_id) {
            ids.retain(|id| id != verbindungs_id);
        }
        self.inner
            .raum_mitglieder
            .remove_if(raum_id, |_, ids| ids.is_empty());
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rampenlicht_core::types::Rolle;

    fn identitaet(name: &str) -> Identitaet {
        Identitaet {
            user_id: UserId::new(),
            username: name.to_string(),
            rolle: Rolle::Viewer,
        }
    }

    #[tokio::test]
    async fn zulassen_und_entfernen() {
        let registry = ConnectionRegistry::neu();
        let raum = RaumId::neu("r1");

        let zulassung = registry.zulassen(raum.clone(), identitaet("v1"));
        assert_eq!(registry.raum_benutzer_anzahl(&raum), 1);
        assert_eq!(registry.verbindungs_anzahl(), 1);

        let entfernt = registry.entfernen(zulassung.verbindungs_id);
        assert!(entfernt.is_some());
        assert_eq!(registry.raum_benutzer_anzahl(&raum), 0);
        assert_eq!(registry.verbindungs_anzahl(), 0);
    }

    #[tokio::test]
    async fn entfernen_ist_idempotent() {
        let registry = ConnectionRegistry::neu();
        let zulassung = registry.zulassen(RaumId::neu("r1"), identitaet("v1"));

        assert!(registry.entfernen(zulassung.verbindungs_id).is_some());
        // Zweiter Aufruf ist ein No-Op, kein Fehler
        assert!(registry.entfernen(zulassung.verbindungs_id).is_none());
        assert!(registry.entfernen(zulassung.verbindungs_id).is_none());
    }

    #[tokio::test]
    async fn leerer_raum_wird_geloescht() {
        let registry = ConnectionRegistry::neu();
        let raum = RaumId::neu("r1");

        let z1 = registry.zulassen(raum.clone(), identitaet("v1"));
        let z2 = registry.zulassen(raum.clone(), identitaet("v2"));
        assert!(registry.raum_existiert(&raum));

        registry.entfernen(z1.verbindungs_id);
        assert!(registry.raum_existiert(&raum));

        registry.entfernen(z2.verbindungs_id);
        assert!(!registry.raum_existiert(&raum), "Leerer Raum muss verschwinden");
    }

    #[tokio::test]
    async fn presence_slot_last_connection_wins() {
        let registry = ConnectionRegistry::neu();
        let raum = RaumId::neu("r1");
        let benutzer = identitaet("doppelt");
        let user_id = benutzer.user_id;

        let z1 = registry.zulassen(raum.clone(), benutzer.clone());
        let z2 = registry.zulassen(raum.clone(), benutzer);

        assert_eq!(z2.ersetzt, Some(z1.verbindungs_id));

        // Nur die neue Verbindung ist aufloesbar und im Raum
        let aktuelle = registry.verbindung_fuer_benutzer(&user_id).unwrap();
        assert_eq!(aktuelle.verbindungs_id, z2.verbindungs_id);
        assert_eq!(registry.raum_benutzer_anzahl(&raum), 1);
        assert!(registry.verbindung(&z1.verbindungs_id).is_none());
    }

    #[tokio::test]
    async fn verdraengte_verbindung_aufraeumen_ist_noop() {
        let registry = ConnectionRegistry::neu();
        let raum = RaumId::neu("r1");
        let benutzer = identitaet("doppelt");
        let user_id = benutzer.user_id;

        let z1 = registry.zulassen(raum.clone(), benutzer.clone());
        let _z2 = registry.zulassen(raum.clone(), benutzer);

        // Cleanup der verdraengten Verbindung darf den Presence-Slot der
        // neuen Verbindung nicht beruehren
        assert!(registry.entfernen(z1.verbindungs_id).is_none());
        assert!(registry.verbindung_fuer_benutzer(&user_id).is_some());
        assert_eq!(registry.raum_benutzer_anzahl(&raum), 1);
    }

    #[tokio::test]
    async fn momentaufnahme_ist_stabil() {
        let registry = ConnectionRegistry::neu();
        let raum = RaumId::neu("r1");

        let z1 = registry.zulassen(raum.clone(), identitaet("v1"));
        let _z2 = registry.zulassen(raum.clone(), identitaet("v2"));

        let schnappschuss = registry.verbindungen_im_raum(&raum);
        assert_eq!(schnappschuss.len(), 2);

        // Mutation nach der Momentaufnahme aendert die Kopie nicht
        registry.entfernen(z1.verbindungs_id);
        assert_eq!(schnappschuss.len(), 2);
        assert_eq!(registry.verbindungen_im_raum(&raum).len(), 1);
    }

    #[tokio::test]
    async fn raum_benutzer_liste() {
        let registry = ConnectionRegistry::neu();
        let raum = RaumId::neu("r1");

        let benutzer = identitaet("v1");
        registry.zulassen(raum.clone(), benutzer.clone());

        let liste = registry.raum_benutzer(&raum);
        assert_eq!(liste.len(), 1);
        assert_eq!(liste[0].user_id, benutzer.user_id);
        assert_eq!(liste[0].username, "v1");
        assert_eq!(liste[0].role, Rolle::Viewer);
    }

    #[tokio::test]
    async fn getrennte_raeume_bleiben_getrennt() {
        let registry = ConnectionRegistry::neu();
        let raum_a = RaumId::neu("a");
        let raum_b = RaumId::neu("b");

        registry.zulassen(raum_a.clone(), identitaet("v1"));
        registry.zulassen(raum_b.clone(), identitaet("v2"));
        registry.zulassen(raum_b.clone(), identitaet("v3"));

        assert_eq!(registry.raum_benutzer_anzahl(&raum_a), 1);
        assert_eq!(registry.raum_benutzer_anzahl(&raum_b), 2);
    }

    /// Viele gleichzeitige Zulassungen und Entfernungen: die Endbilanz
    /// muss exakt stimmen und kein entfernter Client in der Liste bleiben.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn gleichzeitige_zulassung_und_entfernung() {
        let registry = ConnectionRegistry::neu();
        let raum = RaumId::neu("belastung");

        let mut tasks = Vec::new();
        for i in 0..50 {
            let registry = registry.clone();
            let raum = raum.clone();
            tasks.push(tokio::spawn(async move {
                let zulassung = registry.zulassen(raum.clone(), identitaet(&format!("v{i}")));
                tokio::task::yield_now().await;
                // Haelfte der Verbindungen trennt sofort wieder
                if i % 2 == 0 {
                    registry.entfernen(zulassung.verbindungs_id);
                    None
                } else {
                    Some(zulassung.verbindungs_id)
                }
            }));
        }

        let mut verbleibend = Vec::new();
        for task in tasks {
            if let Some(id) = task.await.unwrap() {
                verbleibend.push(id);
            }
        }

        assert_eq!(registry.raum_benutzer_anzahl(&raum), verbleibend.len());
        let benutzer = registry.raum_benutzer(&raum);
        assert_eq!(benutzer.len(), verbleibend.len());

        // Restliche Verbindungen entfernen -> Raum verschwindet
        for id in verbleibend {
            assert!(registry.entfernen(id).is_some());
        }
        assert!(!registry.raum_existiert(&raum));
        assert_eq!(registry.verbindungs_anzahl(), 0);
    }

    /// Wettlauf zweier Aufraeum-Pfade: genau ein Aufrufer bekommt die Daten.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn wettlauf_beim_entfernen() {
        for _ in 0..20 {
            let registry = ConnectionRegistry::neu();
            let zulassung = registry.zulassen(RaumId::neu("r1"), identitaet("v1"));
            let id = zulassung.verbindungs_id;

            let r1 = registry.clone();
            let r2 = registry.clone();
            let t1 = tokio::spawn(async move { r1.entfernen(id).is_some() });
            let t2 = tokio::spawn(async move { r2.entfernen(id).is_some() });

            let (a, b) = (t1.await.unwrap(), t2.await.unwrap());
            assert!(a ^ b, "Genau ein Entferner darf die Daten erhalten");
        }
    }
}
