use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::UserProfile;

pub struct ProfileStore {
    pool: SqlitePool,
}

impl ProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_profile).transpose()
    }

    /// Fetch the profile, creating a default one on first access.
    pub async fn get_or_init(&self, user_id: Uuid) -> Result<UserProfile> {
        if let Some(profile) = self.get(user_id).await? {
            return Ok(profile);
        }

        let profile = UserProfile::new(user_id);
        self.upsert(&profile).await?;
        Ok(profile)
    }

    pub async fn upsert(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                user_id, name, birth_date, height_cm, weight_kg,
                average_cycle_length, average_period_length, last_period_start,
                birth_control_type, birth_control_start
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                birth_date = excluded.birth_date,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                average_cycle_length = excluded.average_cycle_length,
                average_period_length = excluded.average_period_length,
                last_period_start = excluded.last_period_start,
                birth_control_type = excluded.birth_control_type,
                birth_control_start = excluded.birth_control_start
            "#,
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.name)
        .bind(profile.birth_date)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(profile.average_cycle_length)
        .bind(profile.average_period_length)
        .bind(profile.last_period_start)
        .bind(&profile.birth_control_type)
        .bind(profile.birth_control_start)
        .execute(&self.pool)
        .await
        .context("Failed to upsert user profile")?;

        Ok(())
    }
}

fn row_to_profile(row: SqliteRow) -> Result<UserProfile> {
    let user_id: String = row.try_get("user_id")?;

    Ok(UserProfile {
        user_id: Uuid::parse_str(&user_id)?,
        name: row.try_get("name")?,
        birth_date: row.try_get("birth_date")?,
        height_cm: row.try_get("height_cm")?,
        weight_kg: row.try_get("weight_kg")?,
        average_cycle_length: row.try_get("average_cycle_length")?,
        average_period_length: row.try_get("average_period_length")?,
        last_period_start: row.try_get("last_period_start")?,
        birth_control_type: row.try_get("birth_control_type")?,
        birth_control_start: row.try_get("birth_control_start")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn get_or_init_creates_defaults_once() {
        let db = Database::in_memory().await.unwrap();
        let store = db.profile();
        let user = Uuid::new_v4();

        assert!(store.get(user).await.unwrap().is_none());

        let profile = store.get_or_init(user).await.unwrap();
        assert_eq!(profile.average_cycle_length, 28);
        assert_eq!(profile.average_period_length, 5);

        // second call reads the stored row instead of re-inserting
        let again = store.get_or_init(user).await.unwrap();
        assert_eq!(again.user_id, user);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let db = Database::in_memory().await.unwrap();
        let store = db.profile();
        let user = Uuid::new_v4();

        let mut profile = UserProfile::new(user);
        profile.name = "Hana".to_string();
        store.upsert(&profile).await.unwrap();

        profile.average_cycle_length = 30;
        profile.last_period_start = NaiveDate::from_ymd_opt(2025, 5, 10);
        store.upsert(&profile).await.unwrap();

        let stored = store.get(user).await.unwrap().unwrap();
        assert_eq!(stored.name, "Hana");
        assert_eq!(stored.average_cycle_length, 30);
        assert_eq!(
            stored.last_period_start,
            NaiveDate::from_ymd_opt(2025, 5, 10)
        );
    }
}
