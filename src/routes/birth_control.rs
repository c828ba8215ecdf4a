use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::BirthControlRecord;
use crate::AppState;

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub user_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

#[derive(Deserialize)]
struct AdherenceQuery {
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Serialize)]
pub struct AdherenceReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub taken_count: i64,
    pub total_days: i64,
    pub rate: f64,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/birth-control/toggle", post(toggle_record))
        .route("/birth-control", get(list_records))
        .route("/birth-control/adherence", get(get_adherence))
        .route("/birth-control/:id", delete(delete_record))
        .with_state(state)
}

/// Record a pill intake for the day, or flip an existing record. The same
/// button records and un-records, so one row per user per day is enough.
async fn toggle_record(
    State(state): State<AppState>,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<BirthControlRecord>, AppError> {
    let store = state.db.birth_control();

    let record = match store.for_date(body.user_id, body.date).await? {
        Some(mut existing) => {
            existing.taken = !existing.taken;
            store.update(&existing).await?;
            if existing.taken {
                tracing::info!("pill intake recorded for {}", body.date);
            } else {
                tracing::info!("pill intake cleared for {}", body.date);
            }
            existing
        }
        None => {
            let record = BirthControlRecord::new(body.user_id, body.date);
            store.insert(&record).await?;
            tracing::info!("pill intake recorded for {}", body.date);
            record
        }
    };

    Ok(Json(record))
}

async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Vec<BirthControlRecord>>, AppError> {
    Ok(Json(
        state.db.birth_control().all_desc(params.user_id).await?,
    ))
}

async fn get_adherence(
    State(state): State<AppState>,
    Query(params): Query<AdherenceQuery>,
) -> Result<Json<AdherenceReport>, AppError> {
    if params.end < params.start {
        return Err(AppError::Invalid(
            "the range end cannot be before its start".to_string(),
        ));
    }

    let taken_count = state
        .db
        .birth_control()
        .taken_count_in_range(params.user_id, params.start, params.end)
        .await?;
    let total_days = (params.end - params.start).num_days() + 1;

    Ok(Json(AdherenceReport {
        start: params.start,
        end: params.end,
        taken_count,
        total_days,
        rate: taken_count as f64 / total_days as f64,
    }))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    if state.db.birth_control().delete(params.user_id, id).await? == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
