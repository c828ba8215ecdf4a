use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct CycleStatsQuery {
    user_id: Uuid,
}

#[derive(Serialize)]
pub struct CycleStat {
    cycle_number: i32,
    /// Inclusive bleeding days of this period.
    period_length: i32,
    /// Days from this start to the next recorded start; 0 for the latest.
    cycle_length: i32,
}

#[derive(Serialize)]
pub struct CycleStatsResponse {
    average_period_length: f64,
    average_cycle_length: f64,
    cycle_stats: Vec<CycleStat>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(get_cycle_stats))
        .with_state(state)
}

async fn get_cycle_stats(
    State(state): State<AppState>,
    Query(query): Query<CycleStatsQuery>,
) -> Result<Json<CycleStatsResponse>, AppError> {
    let completed = state.db.periods().completed_asc(query.user_id).await?;

    let mut stats = Vec::new();
    let mut total_period = 0i64;
    let mut total_cycle = 0i64;
    let mut cycle_samples = 0i64;

    for (i, record) in completed.iter().enumerate() {
        let period_length = record.length_days().unwrap_or(0);
        let cycle_length = completed
            .get(i + 1)
            .map(|next| (next.start_date - record.start_date).num_days())
            .unwrap_or(0);

        total_period += period_length;
        if cycle_length > 0 {
            total_cycle += cycle_length;
            cycle_samples += 1;
        }

        stats.push(CycleStat {
            cycle_number: (i + 1) as i32,
            period_length: period_length as i32,
            cycle_length: cycle_length as i32,
        });
    }

    let count = stats.len() as f64;

    Ok(Json(CycleStatsResponse {
        average_period_length: if count > 0.0 {
            total_period as f64 / count
        } else {
            0.0
        },
        average_cycle_length: if cycle_samples > 0 {
            total_cycle as f64 / cycle_samples as f64
        } else {
            0.0
        },
        cycle_stats: stats,
    }))
}
