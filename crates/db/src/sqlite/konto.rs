//! SQLite-Implementierung des KontoRepository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row as _;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{KontoRecord, NeueTransaktion, TransaktionsRecord, TransaktionsTyp};
use crate::repository::{DbResult, KontoRepository};
use crate::sqlite::pool::{parse_timestamp, SqliteDb};

#[async_trait]
impl KontoRepository for SqliteDb {
    async fn konto_laden(&self, user_id: Uuid) -> DbResult<Option<KontoRecord>> {
        let row = sqlx::query(
            "SELECT user_id, token_balance, total_spent, total_earnings,
                    available_balance, updated_at
             FROM konten WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_konto(&r)).transpose()
    }

    async fn guthaben(&self, user_id: Uuid) -> DbResult<i64> {
        Ok(self
            .konto_laden(user_id)
            .await?
            .map(|k| k.token_balance)
            .unwrap_or(0))
    }

    async fn aufladen(&self, user_id: Uuid, tokens: i64) -> DbResult<KontoRecord> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO konten (user_id, token_balance, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE
             SET token_balance = token_balance + excluded.token_balance,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id.to_string())
        .bind(tokens)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.konto_laden(user_id)
            .await?
            .ok_or_else(|| DbError::intern("Konto nach Aufladung nicht gefunden"))
    }

    async fn abbuchen(&self, user_id: Uuid, tokens: i64) -> DbResult<bool> {
        // Bedingte Abbuchung: das WHERE schuetzt vor Ueberziehung,
        // auch bei konkurrierenden Abbuchungen
        let affected = sqlx::query(
            "UPDATE konten
             SET token_balance = token_balance - ?,
                 total_spent = total_spent + ?,
                 updated_at = ?
             WHERE user_id = ? AND token_balance >= ?",
        )
        .bind(tokens)
        .bind(tokens)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id.to_string())
        .bind(tokens)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn gutschreiben(&self, user_id: Uuid, tokens: i64) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO konten (user_id, total_earnings, available_balance, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE
             SET total_earnings = total_earnings + excluded.total_earnings,
                 available_balance = available_balance + excluded.available_balance,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id.to_string())
        .bind(tokens)
        .bind(tokens)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn transaktion_anlegen(&self, data: NeueTransaktion<'_>) -> DbResult<TransaktionsRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO transaktionen
             (id, user_id, transaction_type, tokens, model_room_id, description, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.user_id.to_string())
        .bind(data.transaction_type.als_str())
        .bind(data.tokens)
        .bind(data.model_room_id)
        .bind(data.description)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(TransaktionsRecord {
            id,
            user_id: data.user_id,
            transaction_type: data.transaction_type,
            tokens: data.tokens,
            model_room_id: data.model_room_id.map(String::from),
            description: data.description.map(String::from),
            created_at: now,
        })
    }

    async fn transaktionen_fuer(&self, user_id: Uuid) -> DbResult<Vec<TransaktionsRecord>> {
        let rows = sqlx::query(
            "SELECT id, user_id, transaction_type, tokens, model_room_id,
                    description, created_at
             FROM transaktionen
             WHERE user_id = ?
             ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transaktion).collect()
    }
}

fn row_to_konto(row: &sqlx::sqlite::SqliteRow) -> DbResult<KontoRecord> {
    let user_str: String = row.try_get("user_id")?;
    let user_id = Uuid::parse_str(&user_str)
        .map_err(|e| DbError::intern(format!("Ungueltige Konto-UUID '{user_str}': {e}")))?;

    Ok(KontoRecord {
        user_id,
        token_balance: row.try_get("token_balance")?,
        total_spent: row.try_get("total_spent")?,
        total_earnings: row.try_get("total_earnings")?,
        available_balance: row.try_get("available_balance")?,
        updated_at: parse_timestamp(row.try_get("updated_at")?)?,
    })
}

fn row_to_transaktion(row: &sqlx::sqlite::SqliteRow) -> DbResult<TransaktionsRecord> {
    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige Transaktions-UUID '{id_str}': {e}")))?;

    let user_str: String = row.try_get("user_id")?;
    let user_id = Uuid::parse_str(&user_str)
        .map_err(|e| DbError::intern(format!("Ungueltige user_id UUID '{user_str}': {e}")))?;

    let typ_str: String = row.try_get("transaction_type")?;
    let transaction_type: TransaktionsTyp = typ_str.parse().map_err(DbError::intern)?;

    Ok(TransaktionsRecord {
        id,
        user_id,
        transaction_type,
        tokens: row.try_get("tokens")?,
        model_room_id: row.try_get("model_room_id")?,
        description: row.try_get("description")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}
