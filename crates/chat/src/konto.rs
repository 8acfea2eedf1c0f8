//! KontoService – Token-Guthaben und Tip-Verbuchung
//!
//! Tips laufen zweistufig: erst die bedingte Abbuchung beim Viewer,
//! dann die Gutschrift beim Model abzueglich Plattform-Gebuehr. Beide
//! Seiten erhalten einen Transaktions-Datensatz.

use std::sync::Arc;

use rampenlicht_core::types::{Identitaet, RaumId, UserId};
use rampenlicht_db::{
    models::{NeueTransaktion, TransaktionsTyp},
    KontoRepository,
};
use uuid::Uuid;

use crate::error::ChatResult;

/// Plattform-Gebuehr auf Tips in Prozent
const PLATTFORM_GEBUEHR_PROZENT: i64 = 50;

/// Maximale Laenge der Tip-Beschreibung in Transaktions-Datensaetzen
const BESCHREIBUNG_MAX: usize = 50;

/// KontoService – Guthaben pruefen, Tips verbuchen
pub struct KontoService<K: KontoRepository> {
    repo: Arc<K>,
}

impl<K: KontoRepository> KontoService<K> {
    /// Erstellt einen neuen KontoService
    pub fn neu(repo: Arc<K>) -> Arc<Self> {
        Arc::new(Self { repo })
    }

    /// Prueft ob das Guthaben eines Benutzers einen Betrag deckt
    pub async fn hat_guthaben(&self, user_id: UserId, betrag: i64) -> ChatResult<bool> {
        Ok(self.repo.guthaben(user_id.inner()).await? >= betrag)
    }

    /// Laedt das Guthaben eines Benutzers auf (Kauf-Flow, extern ausgeloest)
    pub async fn aufladen(&self, user_id: UserId, tokens: i64) -> ChatResult<i64> {
        let konto = self.repo.aufladen(user_id.inner(), tokens).await?;
        Ok(konto.token_balance)
    }

    /// Verbucht einen Tip aus dem Chat
    ///
    /// Der Raum-Schluessel eines oeffentlichen Raums ist die User-ID des
    /// Models; nur solche Raeume koennen Tips empfangen. Gibt `false`
    /// zurueck wenn der Raum kein Model-Raum ist oder das Guthaben nicht
    /// reicht – in beiden Faellen bleibt jedes Konto unveraendert.
    pub async fn tip_verbuchen(
        &self,
        viewer: &Identitaet,
        model_room_id: &RaumId,
        betrag: i64,
        nachricht: &str,
    ) -> ChatResult<bool> {
        if betrag <= 0 {
            return Ok(false);
        }

        // Model-User-ID aus dem Raum-Schluessel; private Raeume scheitern hier
        let model_id = match Uuid::parse_str(model_room_id.als_str()) {
            Ok(id) => UserId(id),
            Err(_) => {
                tracing::debug!(room_id = %model_room_id, "Tip in Nicht-Model-Raum verworfen");
                return Ok(false);
            }
        };

        // Bedingte Abbuchung schuetzt vor Ueberziehung auch unter Konkurrenz
        if !self.repo.abbuchen(viewer.user_id.inner(), betrag).await? {
            tracing::debug!(
                viewer = %viewer.user_id,
                betrag,
                "Tip abgelehnt: Guthaben unzureichend"
            );
            return Ok(false);
        }

        let gebuehr = betrag * PLATTFORM_GEBUEHR_PROZENT / 100;
        let model_anteil = betrag - gebuehr;
        self.repo
            .gutschreiben(model_id.inner(), model_anteil)
            .await?;

        let beschreibung = beschreibung_kuerzen(nachricht);
        let tip_beschreibung = format!("Chat-Tip: {beschreibung}");
        let einnahme_beschreibung = format!("Tip-Einnahme: {beschreibung}");

        self.repo
            .transaktion_anlegen(NeueTransaktion {
                user_id: viewer.user_id.inner(),
                transaction_type: TransaktionsTyp::Tip,
                tokens: betrag,
                model_room_id: Some(model_room_id.als_str()),
                description: Some(&tip_beschreibung),
            })
            .await?;
        self.repo
            .transaktion_anlegen(NeueTransaktion {
                user_id: model_id.inner(),
                transaction_type: TransaktionsTyp::Earning,
                tokens: model_anteil,
                model_room_id: Some(model_room_id.als_str()),
                description: Some(&einnahme_beschreibung),
            })
            .await?;

        tracing::info!(
            viewer = %viewer.user_id,
            model = %model_id,
            betrag,
            model_anteil,
            "Tip verbucht"
        );

        Ok(true)
    }
}

/// Kuerzt den Nachrichtentext fuer die Transaktions-Beschreibung
fn beschreibung_kuerzen(nachricht: &str) -> String {
    if nachricht.chars().count() > BESCHREIBUNG_MAX {
        let kurz: String = nachricht.chars().take(BESCHREIBUNG_MAX).collect();
        format!("{kurz}...")
    } else {
        nachricht.to_string()
    }
}
