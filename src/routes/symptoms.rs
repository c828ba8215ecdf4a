use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Symptom, SymptomType};
use crate::AppState;

#[derive(Deserialize)]
pub struct NewSymptom {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub symptom_type: SymptomType,
    pub severity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSymptomRequest {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub symptom_type: SymptomType,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

#[derive(Deserialize)]
struct SymptomListQuery {
    user_id: Uuid,
    date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct SymptomsByDate {
    pub date: NaiveDate,
    pub symptoms: Vec<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/symptom", post(log_symptom))
        .route("/symptom", delete(delete_symptom))
        .route("/symptoms", get(get_symptoms_grouped))
        .route("/symptom/all", get(get_symptoms_flat))
        .with_state(state)
}

async fn log_symptom(
    State(state): State<AppState>,
    Json(body): Json<NewSymptom>,
) -> Result<(StatusCode, Json<Symptom>), AppError> {
    if !(1..=5).contains(&body.severity) {
        return Err(AppError::Invalid(
            "severity must be between 1 and 5".to_string(),
        ));
    }

    let symptom = Symptom {
        id: Uuid::new_v4(),
        user_id: body.user_id,
        date: body.date,
        symptom_type: body.symptom_type,
        severity: body.severity,
        notes: body.notes.unwrap_or_default(),
    };

    state.db.symptoms().insert(&symptom).await?;

    Ok((StatusCode::CREATED, Json(symptom)))
}

async fn delete_symptom(
    State(state): State<AppState>,
    Json(payload): Json<DeleteSymptomRequest>,
) -> Result<StatusCode, AppError> {
    let removed = state
        .db
        .symptoms()
        .delete_by(payload.user_id, payload.date, payload.symptom_type)
        .await?;

    if removed == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn get_symptoms_flat(
    State(state): State<AppState>,
    Query(query): Query<SymptomListQuery>,
) -> Result<Json<Vec<Symptom>>, AppError> {
    let store = state.db.symptoms();
    let logs = match query.date {
        Some(date) => store.for_date(query.user_id, date).await?,
        None => store.all_desc(query.user_id).await?,
    };

    Ok(Json(logs))
}

async fn get_symptoms_grouped(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<SymptomsByDate>>, AppError> {
    let logs = state.db.symptoms().all_desc(query.user_id).await?;

    let mut map = BTreeMap::<NaiveDate, Vec<String>>::new();
    for log in logs {
        map.entry(log.date)
            .or_default()
            .push(log.symptom_type.to_string());
    }

    let result: Vec<SymptomsByDate> = map
        .into_iter()
        .map(|(date, symptoms)| SymptomsByDate { date, symptoms })
        .collect();

    Ok(Json(result))
}
