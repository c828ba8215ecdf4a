pub mod estimator;
pub mod tracker;

use chrono::NaiveDate;

/// Every day from `start` to `end`, inclusive. Empty when `end < start`.
pub fn day_span(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current = current + chrono::Duration::days(1);
    }
    days
}
