use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::tracker::PendingPeriod;
use crate::cycle::{day_span, estimator};
use crate::error::AppError;
use crate::models::{CycleSummary, PeriodFlow, PeriodRecord};
use crate::AppState;

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct NewPeriod {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flow: Option<PeriodFlow>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePeriod {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flow: Option<PeriodFlow>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct DraftDate {
    pub user_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct DraftUser {
    pub user_id: Uuid,
}

/// Inclusive preview of the drafted span, for the confirmation step.
#[derive(Serialize)]
pub struct DraftPreview {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<NaiveDate>,
}

#[derive(Serialize)]
pub struct SavedPeriod {
    pub record: PeriodRecord,
    pub average_cycle_length: i32,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/period", get(get_cycle_summary).post(create_period))
        .route("/period/current", get(get_current_period))
        .route("/period/start", post(start_period))
        .route("/period/end", post(end_period))
        .route("/period/save", post(save_period))
        .route("/period/cancel", post(cancel_period))
        .route("/period/:id", put(update_period).delete(delete_period))
        .route("/periods", get(list_periods))
        .with_state(state)
}

fn validate_dates(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), AppError> {
    let today = Utc::now().date_naive();
    if start > today {
        return Err(AppError::FutureDate);
    }
    if let Some(end) = end {
        if end > today {
            return Err(AppError::FutureDate);
        }
        if end < start {
            return Err(AppError::EndBeforeStart);
        }
    }
    Ok(())
}

async fn create_period(
    State(state): State<AppState>,
    Json(body): Json<NewPeriod>,
) -> Result<(StatusCode, Json<PeriodRecord>), AppError> {
    validate_dates(body.start_date, body.end_date)?;

    if body.end_date.is_none() {
        if let Some(open) = state.db.periods().current_open(body.user_id).await? {
            return Err(AppError::OpenPeriod(open.start_date));
        }
    }

    let mut record = PeriodRecord::new(body.user_id, body.start_date, body.end_date);
    if let Some(flow) = body.flow {
        record.flow = flow;
    }
    if let Some(notes) = body.notes {
        record.notes = notes;
    }

    state.db.periods().insert(&record).await?;
    estimator::recalculate(&state.db, body.user_id).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePeriod>,
) -> Result<Json<PeriodRecord>, AppError> {
    let Some(mut record) = state.db.periods().get(body.user_id, id).await? else {
        return Err(AppError::NotFound);
    };

    validate_dates(body.start_date, body.end_date)?;

    if body.end_date.is_none() {
        if let Some(open) = state.db.periods().current_open(body.user_id).await? {
            if open.id != id {
                return Err(AppError::OpenPeriod(open.start_date));
            }
        }
    }

    record.start_date = body.start_date;
    record.end_date = body.end_date;
    if let Some(flow) = body.flow {
        record.flow = flow;
    }
    if let Some(notes) = body.notes {
        record.notes = notes;
    }

    if state.db.periods().update(&record).await? == 0 {
        return Err(AppError::NotFound);
    }
    estimator::recalculate(&state.db, body.user_id).await?;

    Ok(Json(record))
}

async fn delete_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    if state.db.periods().delete(params.user_id, id).await? == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!("period record {} deleted", id);
    estimator::recalculate(&state.db, params.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_periods(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Vec<PeriodRecord>>, AppError> {
    Ok(Json(state.db.periods().all_desc(params.user_id).await?))
}

async fn get_current_period(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PeriodRecord>, AppError> {
    match state.db.periods().current_open(params.user_id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::NotFound),
    }
}

async fn get_cycle_summary(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<CycleSummary>, AppError> {
    let Some(profile) = state.db.profile().get(params.user_id).await? else {
        return Err(AppError::NotFound);
    };
    let Some(last) = profile.last_period_start else {
        return Err(AppError::NotFound);
    };

    let today = Utc::now().date_naive();
    if last > today {
        tracing::error!("last period start {} is in the future; refusing to predict", last);
        return Err(AppError::Invalid(
            "the recorded last period start is in the future".to_string(),
        ));
    }

    let cycle_day = (today - last).num_days() + 1;
    let next_expected_start = last + Duration::days(profile.effective_cycle_length() as i64);

    Ok(Json(CycleSummary {
        cycle_day,
        average_cycle_length: profile.average_cycle_length,
        last_period_start: last,
        next_expected_start,
        period_expected_in_days: (next_expected_start - today).num_days(),
    }))
}

async fn start_period(
    State(state): State<AppState>,
    Json(body): Json<DraftDate>,
) -> Result<Json<PendingPeriod>, AppError> {
    let draft = state.tracker.start(body.user_id, body.date).await?;
    Ok(Json(draft))
}

async fn end_period(
    State(state): State<AppState>,
    Json(body): Json<DraftDate>,
) -> Result<Json<DraftPreview>, AppError> {
    let draft = state.tracker.end(body.user_id, body.date).await?;
    Ok(Json(DraftPreview {
        start: draft.start,
        end: body.date,
        days: day_span(draft.start, body.date),
    }))
}

async fn save_period(
    State(state): State<AppState>,
    Json(body): Json<DraftUser>,
) -> Result<(StatusCode, Json<SavedPeriod>), AppError> {
    let (record, estimate) = state.tracker.save(body.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(SavedPeriod {
            record,
            average_cycle_length: estimate.average_days,
        }),
    ))
}

async fn cancel_period(
    State(state): State<AppState>,
    Json(body): Json<DraftUser>,
) -> Result<Json<Option<PendingPeriod>>, AppError> {
    let discarded = state.tracker.cancel(body.user_id).await;
    if discarded.is_some() {
        tracing::info!("pending period entry discarded");
    }
    Ok(Json(discarded))
}
