//! Average cycle length estimation.
//!
//! The average is the arithmetic mean of the day gaps between consecutive
//! completed period starts, rounded half-up. Fewer than two completed records
//! (or no usable gaps) yields 0, which readers display as "not enough data"
//! and replace with the default length for predictions.

use anyhow::Result;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{PeriodRecord, UserProfile};
use crate::store::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleLengthEstimate {
    /// Whole days; 0 means insufficient data.
    pub average_days: i32,
    /// Start date of the most recent completed period, if any.
    pub last_start: Option<NaiveDate>,
    /// Number of gaps that survived the anomaly filter.
    pub sample_gaps: usize,
}

/// Compute the average over completed records sorted ascending by start date.
/// Non-increasing gaps are data anomalies: they are logged and skipped, never
/// fatal.
pub fn average_cycle_length(completed: &[PeriodRecord]) -> CycleLengthEstimate {
    let last_start = completed.last().map(|p| p.start_date);

    if completed.len() < 2 {
        tracing::debug!(
            "not enough completed periods to average a cycle length ({} recorded, need 2)",
            completed.len()
        );
        return CycleLengthEstimate {
            average_days: 0,
            last_start,
            sample_gaps: 0,
        };
    }

    let mut gaps: Vec<i64> = Vec::new();
    for pair in completed.windows(2) {
        let days = (pair[1].start_date - pair[0].start_date).num_days();
        if days > 0 {
            tracing::debug!(
                "cycle gap from {} to {}: {} days",
                pair[0].start_date,
                pair[1].start_date,
                days
            );
            gaps.push(days);
        } else {
            tracing::warn!(
                "skipping non-increasing gap of {} days between periods starting {} and {}",
                days,
                pair[0].start_date,
                pair[1].start_date
            );
        }
    }

    if gaps.is_empty() {
        tracing::debug!("no usable cycle gaps; leaving the average at 0");
        return CycleLengthEstimate {
            average_days: 0,
            last_start,
            sample_gaps: 0,
        };
    }

    let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
    // round half-up
    let average_days = (mean + 0.5).floor() as i32;

    CycleLengthEstimate {
        average_days,
        last_start,
        sample_gaps: gaps.len(),
    }
}

/// Recompute the user's average cycle length and upsert the profile
/// aggregate. Called after every period insert, update, or delete. The
/// result is returned so callers can await and react to failures instead of
/// firing and forgetting.
pub async fn recalculate(db: &Database, user_id: Uuid) -> Result<CycleLengthEstimate> {
    let completed = db.periods().completed_asc(user_id).await?;
    tracing::debug!(
        "fetched {} completed periods for cycle calculation",
        completed.len()
    );

    let estimate = average_cycle_length(&completed);

    let mut profile = db
        .profile()
        .get(user_id)
        .await?
        .unwrap_or_else(|| UserProfile::new(user_id));

    profile.average_cycle_length = estimate.average_days;
    if let Some(last) = estimate.last_start {
        profile.last_period_start = Some(last);
    }

    db.profile().upsert(&profile).await?;
    tracing::debug!(
        "average cycle length updated to {} days (last start {:?})",
        estimate.average_days,
        profile.last_period_start
    );

    Ok(estimate)
}
