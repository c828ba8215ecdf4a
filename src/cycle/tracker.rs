//! Two-step period entry: choose a start date, choose an end date, then save
//! or cancel. The draft lives in memory only; nothing is persisted until
//! save, and cancel discards the draft without touching storage.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cycle::estimator::{self, CycleLengthEstimate};
use crate::error::AppError;
use crate::models::PeriodRecord;
use crate::store::Database;

/// An in-progress period entry. `end` is set once a valid end date has been
/// chosen (the save step requires it).
#[derive(Debug, Clone, Serialize)]
pub struct PendingPeriod {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct PeriodTracker {
    db: Database,
    drafts: Arc<Mutex<HashMap<Uuid, PendingPeriod>>>,
}

impl PeriodTracker {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            drafts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Begin a draft at `date`. Rejected when the date is in the future, when
    /// a recorded period already covers it (the rejection carries the
    /// existing record so the caller can offer deletion instead), or when an
    /// open period exists.
    pub async fn start(&self, user_id: Uuid, date: NaiveDate) -> Result<PendingPeriod, AppError> {
        if date > Utc::now().date_naive() {
            return Err(AppError::FutureDate);
        }

        if let Some(existing) = self.db.periods().covering(user_id, date).await? {
            return Err(AppError::PeriodExists(existing));
        }

        if let Some(open) = self.db.periods().current_open(user_id).await? {
            return Err(AppError::OpenPeriod(open.start_date));
        }

        let draft = PendingPeriod {
            start: date,
            end: None,
        };
        self.drafts.lock().await.insert(user_id, draft.clone());
        tracing::info!("period start chosen: {}", date);
        Ok(draft)
    }

    /// Choose the end date for the current draft. An end before the start
    /// resets the draft entirely; the caller has to pick a new start.
    pub async fn end(&self, user_id: Uuid, date: NaiveDate) -> Result<PendingPeriod, AppError> {
        if date > Utc::now().date_naive() {
            return Err(AppError::FutureDate);
        }

        let mut drafts = self.drafts.lock().await;
        let Some(draft) = drafts.get_mut(&user_id) else {
            return Err(AppError::NoPendingStart);
        };

        if date < draft.start {
            drafts.remove(&user_id);
            return Err(AppError::EndBeforeStart);
        }

        draft.end = Some(date);
        Ok(draft.clone())
    }

    /// Persist the completed draft and refresh the cycle length estimate.
    pub async fn save(
        &self,
        user_id: Uuid,
    ) -> Result<(PeriodRecord, CycleLengthEstimate), AppError> {
        let draft = {
            let mut drafts = self.drafts.lock().await;
            let ready = drafts.get(&user_id).map_or(false, |d| d.end.is_some());
            if ready {
                drafts.remove(&user_id)
            } else {
                None
            }
        };

        let Some(draft) = draft else {
            return Err(AppError::NothingToSave);
        };
        let Some(end) = draft.end else {
            return Err(AppError::NothingToSave);
        };

        let record = PeriodRecord::new(user_id, draft.start, Some(end));
        self.db.periods().insert(&record).await?;
        tracing::info!("period recorded: {} to {}", draft.start, end);

        let estimate = estimator::recalculate(&self.db, user_id).await?;
        Ok((record, estimate))
    }

    /// Discard the draft, returning whatever was pending.
    pub async fn cancel(&self, user_id: Uuid) -> Option<PendingPeriod> {
        self.drafts.lock().await.remove(&user_id)
    }

    pub async fn pending(&self, user_id: Uuid) -> Option<PendingPeriod> {
        self.drafts.lock().await.get(&user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn tracker() -> (PeriodTracker, Database) {
        let db = Database::in_memory().await.unwrap();
        (PeriodTracker::new(db.clone()), db)
    }

    #[tokio::test]
    async fn future_dates_are_rejected() {
        let (tracker, _db) = tracker().await;
        let user = Uuid::new_v4();

        let err = tracker.start(user, today() + Duration::days(2)).await;
        assert!(matches!(err, Err(AppError::FutureDate)));

        tracker.start(user, today() - Duration::days(5)).await.unwrap();
        let err = tracker.end(user, today() + Duration::days(1)).await;
        assert!(matches!(err, Err(AppError::FutureDate)));
        // the draft survives a future-date rejection
        assert!(tracker.pending(user).await.is_some());
    }

    #[tokio::test]
    async fn covered_date_rejection_carries_the_existing_record() {
        let (tracker, db) = tracker().await;
        let user = Uuid::new_v4();

        let existing = PeriodRecord::new(
            user,
            today() - Duration::days(10),
            Some(today() - Duration::days(6)),
        );
        db.periods().insert(&existing).await.unwrap();

        match tracker.start(user, today() - Duration::days(8)).await {
            Err(AppError::PeriodExists(record)) => assert_eq!(record.id, existing.id),
            other => panic!("expected PeriodExists, got {:?}", other.map(|d| d.start)),
        }
    }

    #[tokio::test]
    async fn open_period_blocks_a_new_start() {
        let (tracker, db) = tracker().await;
        let user = Uuid::new_v4();

        let open = PeriodRecord::new(user, today() - Duration::days(3), None);
        db.periods().insert(&open).await.unwrap();

        let err = tracker.start(user, today()).await;
        assert!(matches!(err, Err(AppError::OpenPeriod(_))));
    }

    #[tokio::test]
    async fn end_before_start_resets_the_draft() {
        let (tracker, _db) = tracker().await;
        let user = Uuid::new_v4();

        tracker.start(user, today() - Duration::days(4)).await.unwrap();
        let err = tracker.end(user, today() - Duration::days(6)).await;
        assert!(matches!(err, Err(AppError::EndBeforeStart)));
        assert!(tracker.pending(user).await.is_none());

        // a new end without a fresh start is rejected
        let err = tracker.end(user, today()).await;
        assert!(matches!(err, Err(AppError::NoPendingStart)));
    }

    #[tokio::test]
    async fn save_requires_a_chosen_end() {
        let (tracker, _db) = tracker().await;
        let user = Uuid::new_v4();

        assert!(matches!(
            tracker.save(user).await,
            Err(AppError::NothingToSave)
        ));

        tracker.start(user, today() - Duration::days(4)).await.unwrap();
        assert!(matches!(
            tracker.save(user).await,
            Err(AppError::NothingToSave)
        ));
        // the start-only draft is kept for the end step
        assert!(tracker.pending(user).await.is_some());
    }

    #[tokio::test]
    async fn save_persists_and_updates_the_average() {
        let (tracker, db) = tracker().await;
        let user = Uuid::new_v4();

        // one prior completed period, 28 days before the new one
        let prior = PeriodRecord::new(
            user,
            today() - Duration::days(32),
            Some(today() - Duration::days(28)),
        );
        db.periods().insert(&prior).await.unwrap();

        tracker.start(user, today() - Duration::days(4)).await.unwrap();
        let draft = tracker.end(user, today()).await.unwrap();
        assert_eq!(draft.end, Some(today()));

        let (record, estimate) = tracker.save(user).await.unwrap();
        assert_eq!(record.start_date, today() - Duration::days(4));
        assert_eq!(estimate.average_days, 28);

        let profile = db.profile().get(user).await.unwrap().unwrap();
        assert_eq!(profile.average_cycle_length, 28);
        assert_eq!(profile.last_period_start, Some(record.start_date));

        // the draft is consumed by save
        assert!(tracker.pending(user).await.is_none());
    }

    #[tokio::test]
    async fn cancel_discards_without_persisting() {
        let (tracker, db) = tracker().await;
        let user = Uuid::new_v4();

        tracker.start(user, today() - Duration::days(2)).await.unwrap();
        let discarded = tracker.cancel(user).await.unwrap();
        assert_eq!(discarded.start, today() - Duration::days(2));

        assert!(db.periods().all_desc(user).await.unwrap().is_empty());
        assert!(tracker.cancel(user).await.is_none());
    }
}
