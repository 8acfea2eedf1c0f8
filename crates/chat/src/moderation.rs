//! ModerationService – Mute/Ban-Fakten und Aktions-Protokoll
//!
//! Der Echtzeit-Kern behandelt Moderations-Fakten als reines Praedikat:
//! vor jeder Chat-Nachricht wird geprueft ob der Absender im Raum
//! eingeschraenkt ist. Aktionen selbst werden hier protokolliert;
//! abgelaufene Eintraege bereinigt ein Hintergrund-Task.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use rampenlicht_core::types::{RaumId, UserId};
use rampenlicht_db::{
    models::{ModerationsRecord, NeueModerationsAktion},
    repository::ablauf_aus_minuten,
    ModerationRepository,
};

use crate::error::ChatResult;

/// Cleanup-Intervall fuer abgelaufene Einschraenkungen: 1 Stunde
const MODERATION_CLEANUP_INTERVALL: Duration = Duration::from_secs(60 * 60);

/// ModerationService – Einschraenkungen pruefen und Aktionen protokollieren
pub struct ModerationService<M: ModerationRepository> {
    repo: Arc<M>,
}

impl<M: ModerationRepository + 'static> ModerationService<M> {
    /// Erstellt einen neuen ModerationService
    pub fn neu(repo: Arc<M>) -> Arc<Self> {
        Arc::new(Self { repo })
    }

    /// Startet den automatischen Cleanup-Task fuer abgelaufene Eintraege
    pub fn cleanup_task_starten(service: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(MODERATION_CLEANUP_INTERVALL).await;
                match service.repo.cleanup_expired().await {
                    Ok(anzahl) if anzahl > 0 => {
                        tracing::info!(anzahl, "Abgelaufene Moderations-Eintraege bereinigt");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(fehler = %e, "Fehler beim Moderations-Cleanup");
                    }
                }
            }
        });
    }

    /// Prueft ob ein Benutzer im Raum aktuell eingeschraenkt ist
    ///
    /// `true` bei unabgelaufenem Mute oder Ban fuer (Raum, Benutzer).
    pub async fn ist_eingeschraenkt(&self, room_id: &RaumId, user_id: UserId) -> ChatResult<bool> {
        Ok(self
            .repo
            .is_restricted(room_id.als_str(), user_id.inner())
            .await?)
    }

    /// Protokolliert eine Moderationsaktion
    ///
    /// `duration_minutes` bestimmt den Ablaufzeitpunkt; `None` bedeutet
    /// permanent (bis zur manuellen Aufhebung).
    #[allow(clippy::too_many_arguments)]
    pub async fn aktion_anlegen(
        &self,
        room_id: &RaumId,
        moderator_id: UserId,
        target_user_id: UserId,
        action_type: &str,
        duration_minutes: Option<i64>,
        reason: Option<&str>,
        message_id: Option<Uuid>,
    ) -> ChatResult<ModerationsRecord> {
        let record = self
            .repo
            .create(NeueModerationsAktion {
                room_id: room_id.als_str(),
                moderator_id: moderator_id.inner(),
                target_user_id: target_user_id.inner(),
                action_type,
                duration_minutes,
                reason,
                message_id,
                expires_at: ablauf_aus_minuten(duration_minutes),
            })
            .await?;

        tracing::info!(
            room_id = %room_id,
            moderator = %moderator_id,
            target = %target_user_id,
            aktion = action_type,
            dauer_minuten = ?duration_minutes,
            "Moderationsaktion protokolliert"
        );

        Ok(record)
    }
}
