//! SQLite-Implementierung des ModerationRepository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row as _;
use uuid::Uuid;

use crate::models::{ModerationsRecord, NeueModerationsAktion};
use crate::repository::{DbResult, ModerationRepository};
use crate::sqlite::pool::SqliteDb;

#[async_trait]
impl ModerationRepository for SqliteDb {
    async fn create(&self, data: NeueModerationsAktion<'_>) -> DbResult<ModerationsRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO moderation_actions
             (id, room_id, moderator_id, target_user_id, action_type,
              duration_minutes, reason, message_id, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.room_id)
        .bind(data.moderator_id.to_string())
        .bind(data.target_user_id.to_string())
        .bind(data.action_type)
        .bind(data.duration_minutes)
        .bind(data.reason)
        .bind(data.message_id.map(|m| m.to_string()))
        .bind(data.expires_at.map(|dt| dt.to_rfc3339()))
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(ModerationsRecord {
            id,
            room_id: data.room_id.to_string(),
            moderator_id: data.moderator_id,
            target_user_id: data.target_user_id,
            action_type: data.action_type.to_string(),
            duration_minutes: data.duration_minutes,
            reason: data.reason.map(String::from),
            message_id: data.message_id,
            expires_at: data.expires_at,
            created_at: now,
        })
    }

    async fn is_restricted(&self, room_id: &str, user_id: Uuid) -> DbResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS anzahl FROM moderation_actions
             WHERE room_id = ?
               AND target_user_id = ?
               AND action_type IN ('mute', 'ban')
               AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(room_id)
        .bind(user_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let anzahl: i64 = row.try_get("anzahl")?;
        Ok(anzahl > 0)
    }

    async fn cleanup_expired(&self) -> DbResult<u64> {
        let affected = sqlx::query(
            "DELETE FROM moderation_actions
             WHERE expires_at IS NOT NULL AND expires_at <= ?",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }
}
