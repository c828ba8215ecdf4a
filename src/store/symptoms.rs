use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Symptom, SymptomType};

pub struct SymptomStore {
    pool: SqlitePool,
}

impl SymptomStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, symptom: &Symptom) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO symptoms (id, user_id, date, symptom_type, severity, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(symptom.id.to_string())
        .bind(symptom.user_id.to_string())
        .bind(symptom.date)
        .bind(symptom.symptom_type.to_string())
        .bind(symptom.severity)
        .bind(&symptom.notes)
        .execute(&self.pool)
        .await
        .context("Failed to insert symptom")?;

        Ok(())
    }

    /// Delete every log of one symptom type on one day. Returns rows removed.
    pub async fn delete_by(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        symptom_type: SymptomType,
    ) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM symptoms WHERE user_id = ? AND date = ? AND symptom_type = ?",
        )
        .bind(user_id.to_string())
        .bind(date)
        .bind(symptom_type.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to delete symptom")?;

        Ok(result.rows_affected())
    }

    pub async fn for_date(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<Symptom>> {
        let rows = sqlx::query("SELECT * FROM symptoms WHERE user_id = ? AND date = ?")
            .bind(user_id.to_string())
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_symptom).collect()
    }

    pub async fn all_desc(&self, user_id: Uuid) -> Result<Vec<Symptom>> {
        let rows = sqlx::query("SELECT * FROM symptoms WHERE user_id = ? ORDER BY date DESC")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_symptom).collect()
    }
}

fn row_to_symptom(row: SqliteRow) -> Result<Symptom> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let symptom_type: String = row.try_get("symptom_type")?;

    Ok(Symptom {
        id: Uuid::parse_str(&id)?,
        user_id: Uuid::parse_str(&user_id)?,
        date: row.try_get("date")?,
        symptom_type: symptom_type.parse::<SymptomType>()?,
        severity: row.try_get("severity")?,
        notes: row.try_get("notes")?,
    })
}
