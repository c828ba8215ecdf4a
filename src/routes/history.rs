use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::cmp::Reverse;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::HistoryItem;
use crate::AppState;

#[derive(Deserialize)]
pub struct HistoryQuery {
    user_id: Uuid,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/history", get(get_history))
        .with_state(state)
}

/// Merged timeline of periods, birth-control records, and symptoms, newest
/// first.
async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryItem>>, AppError> {
    let periods = state.db.periods().all_desc(params.user_id).await?;
    let pills = state.db.birth_control().all_desc(params.user_id).await?;
    let symptoms = state.db.symptoms().all_desc(params.user_id).await?;

    let mut items: Vec<HistoryItem> = periods
        .into_iter()
        .map(HistoryItem::Period)
        .chain(pills.into_iter().map(HistoryItem::BirthControl))
        .chain(symptoms.into_iter().map(HistoryItem::Symptom))
        .collect();

    items.sort_by_key(|item| Reverse(item.date()));

    Ok(Json(items))
}
