pub mod cycle;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use axum::{routing::get, Router};

use cycle::tracker::PeriodTracker;
use store::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tracker: PeriodTracker,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let tracker = PeriodTracker::new(db.clone());
        Self { db, tracker }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::period::routes(state.clone()))
        .merge(routes::symptoms::routes(state.clone()))
        .merge(routes::birth_control::routes(state.clone()))
        .merge(routes::profile::routes(state.clone()))
        .merge(routes::stats::routes(state.clone()))
        .merge(routes::history::routes(state))
        .route("/health", get(|| async { "✅ Backend up" }))
}
