use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::BirthControlRecord;

pub struct BirthControlStore {
    pool: SqlitePool,
}

impl BirthControlStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, record: &BirthControlRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO birth_control_records (id, user_id, date, taken, times_taken, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.date)
        .bind(record.taken)
        .bind(record.times_taken)
        .bind(&record.notes)
        .execute(&self.pool)
        .await
        .context("Failed to insert birth control record")?;

        Ok(())
    }

    pub async fn update(&self, record: &BirthControlRecord) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE birth_control_records
            SET taken = ?, times_taken = ?, notes = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(record.taken)
        .bind(record.times_taken)
        .bind(&record.notes)
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update birth control record")?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM birth_control_records WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete birth control record")?;

        Ok(result.rows_affected())
    }

    pub async fn for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<BirthControlRecord>> {
        let row = sqlx::query("SELECT * FROM birth_control_records WHERE user_id = ? AND date = ?")
            .bind(user_id.to_string())
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_record).transpose()
    }

    pub async fn all_desc(&self, user_id: Uuid) -> Result<Vec<BirthControlRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM birth_control_records WHERE user_id = ? ORDER BY date DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }

    /// Days in the inclusive range on which the pill was taken.
    pub async fn taken_count_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS taken_count FROM birth_control_records
            WHERE user_id = ? AND date BETWEEN ? AND ? AND taken = 1
            "#,
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("taken_count")?)
    }
}

fn row_to_record(row: SqliteRow) -> Result<BirthControlRecord> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;

    Ok(BirthControlRecord {
        id: Uuid::parse_str(&id)?,
        user_id: Uuid::parse_str(&user_id)?,
        date: row.try_get("date")?,
        taken: row.try_get("taken")?,
        times_taken: row.try_get("times_taken")?,
        notes: row.try_get("notes")?,
    })
}
