//! NachrichtenService – Nachrichten validieren, persistieren, laden, loeschen

use std::sync::Arc;

use uuid::Uuid;

use rampenlicht_core::types::{Identitaet, RaumId, UserId};
use rampenlicht_db::{
    models::{NachrichtenFilter, NeueNachricht},
    ChatMessageRepository,
};

use crate::{
    error::{ChatError, ChatResult},
    types::{ChatNachricht, HistoryAnfrage, NachrichtenTyp},
};

/// Maximale Nachrichtenlaenge in Zeichen
const MAX_NACHRICHTEN_LAENGE: usize = 2000;

/// NachrichtenService verwaltet Chat-Nachrichten in Raeumen
pub struct NachrichtenService<R: ChatMessageRepository> {
    repo: Arc<R>,
}

impl<R: ChatMessageRepository> NachrichtenService<R> {
    /// Erstellt einen neuen NachrichtenService
    pub fn neu(repo: Arc<R>) -> Arc<Self> {
        Arc::new(Self { repo })
    }

    /// Nachricht in einem Raum persistieren
    ///
    /// Der Aufrufer hat Moderations- und Guthaben-Pruefungen bereits
    /// durchgefuehrt; hier wird nur noch der Inhalt validiert.
    pub async fn nachricht_senden(
        &self,
        room_id: &RaumId,
        sender: &Identitaet,
        content: &str,
        message_type: NachrichtenTyp,
        tip_amount: Option<i64>,
    ) -> ChatResult<ChatNachricht> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::UngueltigeEingabe(
                "Nachrichteninhalt darf nicht leer sein".into(),
            ));
        }

        if content.chars().count() > MAX_NACHRICHTEN_LAENGE {
            return Err(ChatError::UngueltigeEingabe(format!(
                "Nachricht zu lang: {} Zeichen (Maximum: {})",
                content.chars().count(),
                MAX_NACHRICHTEN_LAENGE
            )));
        }

        let record = self
            .repo
            .create(NeueNachricht {
                room_id: room_id.als_str(),
                sender_id: sender.user_id.inner(),
                sender_username: &sender.username,
                sender_role: sender.rolle,
                message_type: message_type.into(),
                content,
                tip_amount,
            })
            .await?;

        Ok(record.into())
    }

    /// Nachrichten-History eines Raums laden (chronologisch, neueste zuletzt)
    pub async fn history_laden(&self, anfrage: HistoryAnfrage) -> ChatResult<Vec<ChatNachricht>> {
        let records = self
            .repo
            .get_history(NachrichtenFilter {
                room_id: anfrage.room_id.als_str().to_string(),
                before: anfrage.before,
                limit: anfrage.limit,
            })
            .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Nachricht weich loeschen (Soft-Delete durch die Moderation)
    ///
    /// Die Autorisierung (Rolle, Raum-Eigentum) prueft der Aufrufer.
    pub async fn nachricht_loeschen(
        &self,
        message_id: Uuid,
        geloescht_von: UserId,
    ) -> ChatResult<()> {
        let geloescht = self
            .repo
            .mark_deleted(message_id, geloescht_von.inner())
            .await?;

        if !geloescht {
            return Err(ChatError::NachrichtNichtGefunden(message_id.to_string()));
        }

        Ok(())
    }
}
