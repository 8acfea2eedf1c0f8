//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Alle Traits liefern Send-Futures
//! (`async_trait`), damit sie aus axum-Tasks heraus verwendet werden koennen.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{
    ChatNachrichtRecord, KontoRecord, ModerationsRecord, NachrichtenFilter, NeueModerationsAktion,
    NeueNachricht, NeueTransaktion, TransaktionsRecord,
};

/// Result-Typ fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://rampenlicht.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://rampenlicht.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Chat-Nachrichten
#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    /// Persistiert eine neue Nachricht und gibt den vollstaendigen Datensatz zurueck
    async fn create(&self, data: NeueNachricht<'_>) -> DbResult<ChatNachrichtRecord>;

    /// Laedt eine Nachricht anhand ihrer ID (auch geloeschte Tombstones)
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<ChatNachrichtRecord>>;

    /// Laedt die History eines Raums, chronologisch (aelteste zuerst),
    /// weich geloeschte Nachrichten ausgenommen
    async fn get_history(&self, filter: NachrichtenFilter) -> DbResult<Vec<ChatNachrichtRecord>>;

    /// Markiert eine Nachricht als geloescht (Soft-Delete)
    ///
    /// Gibt `false` zurueck wenn die Nachricht nicht existiert oder bereits
    /// geloescht war.
    async fn mark_deleted(&self, id: Uuid, deleted_by: Uuid) -> DbResult<bool>;
}

/// Repository fuer Moderationsaktionen (Mute/Ban/Kick/Delete)
#[async_trait]
pub trait ModerationRepository: Send + Sync {
    /// Persistiert eine Moderationsaktion
    async fn create(&self, data: NeueModerationsAktion<'_>) -> DbResult<ModerationsRecord>;

    /// Prueft ob fuer (Raum, Benutzer) ein unabgelaufener Mute oder Ban existiert
    async fn is_restricted(&self, room_id: &str, user_id: Uuid) -> DbResult<bool>;

    /// Entfernt abgelaufene Einschraenkungen, gibt die Anzahl zurueck
    async fn cleanup_expired(&self) -> DbResult<u64>;
}

/// Repository fuer Token-Konten und Transaktionen
#[async_trait]
pub trait KontoRepository: Send + Sync {
    /// Laedt das Konto eines Benutzers
    async fn konto_laden(&self, user_id: Uuid) -> DbResult<Option<KontoRecord>>;

    /// Gibt das verfuegbare Token-Guthaben zurueck (0 wenn kein Konto existiert)
    async fn guthaben(&self, user_id: Uuid) -> DbResult<i64>;

    /// Schreibt einem Benutzer Tokens gut (legt das Konto bei Bedarf an)
    async fn aufladen(&self, user_id: Uuid, tokens: i64) -> DbResult<KontoRecord>;

    /// Bucht Tokens vom Guthaben ab, erhoeht `total_spent`
    ///
    /// Bedingte Abbuchung: gibt `false` zurueck wenn das Guthaben nicht
    /// ausreicht; das Konto bleibt dann unveraendert.
    async fn abbuchen(&self, user_id: Uuid, tokens: i64) -> DbResult<bool>;

    /// Schreibt einem Model Einnahmen gut (`total_earnings` + `available_balance`)
    async fn gutschreiben(&self, user_id: Uuid, tokens: i64) -> DbResult<()>;

    /// Persistiert eine Transaktion
    async fn transaktion_anlegen(&self, data: NeueTransaktion<'_>) -> DbResult<TransaktionsRecord>;

    /// Laedt alle Transaktionen eines Benutzers (neueste zuerst)
    async fn transaktionen_fuer(&self, user_id: Uuid) -> DbResult<Vec<TransaktionsRecord>>;
}

/// Hilfsfunktion: rechnet eine optionale Dauer in Minuten in einen
/// Ablaufzeitpunkt um
pub fn ablauf_aus_minuten(duration_minutes: Option<i64>) -> Option<DateTime<Utc>> {
    duration_minutes.map(|min| Utc::now() + chrono::Duration::minutes(min))
}
