use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::UserProfile;
use crate::AppState;

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

/// Biographical fields only; the computed aggregate fields are owned by the
/// cycle estimator and cannot be written through this route.
#[derive(Deserialize)]
pub struct UpdateProfile {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub birth_control_type: Option<String>,
    pub birth_control_start: Option<NaiveDate>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .with_state(state)
}

async fn get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.db.profile().get_or_init(params.user_id).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    Json(body): Json<UpdateProfile>,
) -> Result<Json<UserProfile>, AppError> {
    if let Some(height) = body.height_cm {
        if !(100.0..=250.0).contains(&height) {
            return Err(AppError::Invalid(
                "height must be between 100 and 250 cm".to_string(),
            ));
        }
    }
    if let Some(weight) = body.weight_kg {
        if !(20.0..=200.0).contains(&weight) {
            return Err(AppError::Invalid(
                "weight must be between 20 and 200 kg".to_string(),
            ));
        }
    }

    let mut profile = state
        .db
        .profile()
        .get(body.user_id)
        .await?
        .unwrap_or_else(|| UserProfile::new(body.user_id));

    if let Some(name) = body.name {
        profile.name = name;
    }
    profile.birth_date = body.birth_date.or(profile.birth_date);
    profile.height_cm = body.height_cm.or(profile.height_cm);
    profile.weight_kg = body.weight_kg.or(profile.weight_kg);
    if let Some(kind) = body.birth_control_type {
        profile.birth_control_type = kind;
    }
    profile.birth_control_start = body.birth_control_start.or(profile.birth_control_start);

    state.db.profile().upsert(&profile).await?;

    Ok(Json(profile))
}
