//! SQLite-Implementierung des ChatMessageRepository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row as _;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{ChatNachrichtRecord, NachrichtenFilter, NachrichtenTyp, NeueNachricht};
use crate::repository::{ChatMessageRepository, DbResult};
use crate::sqlite::pool::{parse_timestamp, SqliteDb};

#[async_trait]
impl ChatMessageRepository for SqliteDb {
    async fn create(&self, data: NeueNachricht<'_>) -> DbResult<ChatNachrichtRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO chat_messages
             (id, room_id, sender_id, sender_username, sender_role,
              message_type, content, tip_amount, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.room_id)
        .bind(data.sender_id.to_string())
        .bind(data.sender_username)
        .bind(data.sender_role.als_str())
        .bind(data.message_type.als_str())
        .bind(data.content)
        .bind(data.tip_amount)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(ChatNachrichtRecord {
            id,
            room_id: data.room_id.to_string(),
            sender_id: data.sender_id,
            sender_username: data.sender_username.to_string(),
            sender_role: data.sender_role,
            message_type: data.message_type,
            content: data.content.to_string(),
            tip_amount: data.tip_amount,
            created_at: now,
            deleted_at: None,
            deleted_by: None,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<ChatNachrichtRecord>> {
        let row = sqlx::query(
            "SELECT id, room_id, sender_id, sender_username, sender_role,
                    message_type, content, tip_amount, created_at, deleted_at, deleted_by
             FROM chat_messages WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_nachricht(&r)).transpose()
    }

    async fn get_history(&self, filter: NachrichtenFilter) -> DbResult<Vec<ChatNachrichtRecord>> {
        let limit = filter.limit.unwrap_or(50).min(100);

        let rows = if let Some(before) = filter.before {
            sqlx::query(
                "SELECT id, room_id, sender_id, sender_username, sender_role,
                        message_type, content, tip_amount, created_at, deleted_at, deleted_by
                 FROM chat_messages
                 WHERE room_id = ? AND created_at < ? AND deleted_at IS NULL
                 ORDER BY created_at DESC
                 LIMIT ?",
            )
            .bind(&filter.room_id)
            .bind(before.to_rfc3339())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT id, room_id, sender_id, sender_username, sender_role,
                        message_type, content, tip_amount, created_at, deleted_at, deleted_by
                 FROM chat_messages
                 WHERE room_id = ? AND deleted_at IS NULL
                 ORDER BY created_at DESC
                 LIMIT ?",
            )
            .bind(&filter.room_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        // Chronologisch sortieren (aelteste zuerst, neueste zuletzt)
        let mut records: Vec<ChatNachrichtRecord> =
            rows.iter().map(row_to_nachricht).collect::<DbResult<_>>()?;
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn mark_deleted(&self, id: Uuid, deleted_by: Uuid) -> DbResult<bool> {
        let affected = sqlx::query(
            "UPDATE chat_messages SET deleted_at = ?, deleted_by = ?
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(deleted_by.to_string())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }
}

pub(crate) fn row_to_nachricht(row: &sqlx::sqlite::SqliteRow) -> DbResult<ChatNachrichtRecord> {
    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige Nachrichten-UUID '{id_str}': {e}")))?;

    let sender_str: String = row.try_get("sender_id")?;
    let sender_id = Uuid::parse_str(&sender_str)
        .map_err(|e| DbError::intern(format!("Ungueltige sender_id UUID '{sender_str}': {e}")))?;

    let rolle_str: String = row.try_get("sender_role")?;
    let sender_role = rolle_str.parse().map_err(DbError::intern)?;

    let typ_str: String = row.try_get("message_type")?;
    let message_type: NachrichtenTyp = typ_str.parse().map_err(DbError::intern)?;

    let created_at = parse_timestamp(row.try_get("created_at")?)?;
    let deleted_at: Option<String> = row.try_get("deleted_at")?;
    let deleted_at = deleted_at.map(parse_timestamp).transpose()?;

    let deleted_by: Option<String> = row.try_get("deleted_by")?;
    let deleted_by = deleted_by
        .as_deref()
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|e| DbError::intern(format!("Ungueltige deleted_by UUID '{s}': {e}")))
        })
        .transpose()?;

    Ok(ChatNachrichtRecord {
        id,
        room_id: row.try_get("room_id")?,
        sender_id,
        sender_username: row.try_get("sender_username")?,
        sender_role,
        message_type,
        content: row.try_get("content")?,
        tip_amount: row.try_get("tip_amount")?,
        created_at,
        deleted_at,
        deleted_by,
    })
}
