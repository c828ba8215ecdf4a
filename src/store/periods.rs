use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{PeriodFlow, PeriodRecord};

pub struct PeriodStore {
    pool: SqlitePool,
}

impl PeriodStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, record: &PeriodRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO period_records (id, user_id, start_date, end_date, flow, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.flow.to_string())
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert period record")?;

        Ok(())
    }

    pub async fn update(&self, record: &PeriodRecord) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE period_records
            SET start_date = ?, end_date = ?, flow = ?, notes = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.flow.to_string())
        .bind(&record.notes)
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update period record")?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM period_records WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete period record")?;

        Ok(result.rows_affected())
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<PeriodRecord>> {
        let row = sqlx::query("SELECT * FROM period_records WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_period).transpose()
    }

    /// All records, newest first. Display order.
    pub async fn all_desc(&self, user_id: Uuid) -> Result<Vec<PeriodRecord>> {
        let rows =
            sqlx::query("SELECT * FROM period_records WHERE user_id = ? ORDER BY start_date DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_period).collect()
    }

    /// Completed records (end date present) in ascending start order, the
    /// shape the cycle estimator consumes.
    pub async fn completed_asc(&self, user_id: Uuid) -> Result<Vec<PeriodRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM period_records
            WHERE user_id = ? AND end_date IS NOT NULL
            ORDER BY start_date ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_period).collect()
    }

    /// The open record (no end date), if one exists.
    pub async fn current_open(&self, user_id: Uuid) -> Result<Option<PeriodRecord>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM period_records
            WHERE user_id = ? AND end_date IS NULL
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_period).transpose()
    }

    /// A completed record whose span covers the given day, if any.
    pub async fn covering(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<PeriodRecord>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM period_records
            WHERE user_id = ? AND ? BETWEEN start_date AND end_date
            LIMIT 1
            "#,
        )
        .bind(user_id.to_string())
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_period).transpose()
    }
}

fn row_to_period(row: SqliteRow) -> Result<PeriodRecord> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let flow: String = row.try_get("flow")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(PeriodRecord {
        id: Uuid::parse_str(&id)?,
        user_id: Uuid::parse_str(&user_id)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        flow: flow.parse::<PeriodFlow>()?,
        notes: row.try_get("notes")?,
        created_at,
    })
}
