use anyhow::bail;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Cycle length assumed when there are not enough records to compute one.
pub const DEFAULT_CYCLE_LENGTH_DAYS: i32 = 28;
pub const DEFAULT_PERIOD_LENGTH_DAYS: i32 = 5;

/// A recorded period. `end_date` is absent while the period is still open;
/// at most one open record may exist per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flow: PeriodFlow,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl PeriodRecord {
    pub fn new(user_id: Uuid, start_date: NaiveDate, end_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            start_date,
            end_date,
            flow: PeriodFlow::Medium,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Inclusive length in days, once the period has ended.
    pub fn length_days(&self) -> Option<i64> {
        self.end_date.map(|end| (end - self.start_date).num_days() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFlow {
    Light,
    Medium,
    Heavy,
}

impl fmt::Display for PeriodFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeriodFlow::Light => "light",
            PeriodFlow::Medium => "medium",
            PeriodFlow::Heavy => "heavy",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PeriodFlow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(PeriodFlow::Light),
            "medium" => Ok(PeriodFlow::Medium),
            "heavy" => Ok(PeriodFlow::Heavy),
            other => bail!("unknown period flow: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symptom {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub symptom_type: SymptomType,
    /// 1 (very mild) to 5 (very severe).
    pub severity: i32,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomType {
    Cramps,
    Headache,
    MoodSwings,
    Bloating,
    Acne,
    Fatigue,
    BreastTenderness,
    BackPain,
}

impl fmt::Display for SymptomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymptomType::Cramps => "cramps",
            SymptomType::Headache => "headache",
            SymptomType::MoodSwings => "mood_swings",
            SymptomType::Bloating => "bloating",
            SymptomType::Acne => "acne",
            SymptomType::Fatigue => "fatigue",
            SymptomType::BreastTenderness => "breast_tenderness",
            SymptomType::BackPain => "back_pain",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SymptomType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cramps" => Ok(SymptomType::Cramps),
            "headache" => Ok(SymptomType::Headache),
            "mood_swings" => Ok(SymptomType::MoodSwings),
            "bloating" => Ok(SymptomType::Bloating),
            "acne" => Ok(SymptomType::Acne),
            "fatigue" => Ok(SymptomType::Fatigue),
            "breast_tenderness" => Ok(SymptomType::BreastTenderness),
            "back_pain" => Ok(SymptomType::BackPain),
            other => bail!("unknown symptom type: {}", other),
        }
    }
}

/// One pill record per user per day; re-recording the same day toggles `taken`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthControlRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub taken: bool,
    pub times_taken: i32,
    pub notes: String,
}

impl BirthControlRecord {
    pub fn new(user_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            taken: true,
            times_taken: 1,
            notes: String::new(),
        }
    }
}

/// Per-user profile aggregate. `average_cycle_length` of 0 means "insufficient
/// data"; readers fall back to [`DEFAULT_CYCLE_LENGTH_DAYS`] for predictions.
/// The computed fields (`average_cycle_length`, `last_period_start`) are
/// written only by the cycle estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub average_cycle_length: i32,
    pub average_period_length: i32,
    pub last_period_start: Option<NaiveDate>,
    pub birth_control_type: String,
    pub birth_control_start: Option<NaiveDate>,
}

impl UserProfile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            name: String::new(),
            birth_date: None,
            height_cm: None,
            weight_kg: None,
            average_cycle_length: DEFAULT_CYCLE_LENGTH_DAYS,
            average_period_length: DEFAULT_PERIOD_LENGTH_DAYS,
            last_period_start: None,
            birth_control_type: String::new(),
            birth_control_start: None,
        }
    }

    /// Cycle length to use for predictions: the stored average, or the
    /// default when there is not enough data yet.
    pub fn effective_cycle_length(&self) -> i32 {
        if self.average_cycle_length <= 0 {
            DEFAULT_CYCLE_LENGTH_DAYS
        } else {
            self.average_cycle_length
        }
    }
}

/// Next-period prediction derived from the profile aggregate.
#[derive(Debug, Serialize)]
pub struct CycleSummary {
    pub cycle_day: i64,
    pub average_cycle_length: i32,
    pub last_period_start: NaiveDate,
    pub next_expected_start: NaiveDate,
    pub period_expected_in_days: i64,
}

/// A single entry in the merged history timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryItem {
    Period(PeriodRecord),
    BirthControl(BirthControlRecord),
    Symptom(Symptom),
}

impl HistoryItem {
    pub fn date(&self) -> NaiveDate {
        match self {
            HistoryItem::Period(p) => p.start_date,
            HistoryItem::BirthControl(b) => b.date,
            HistoryItem::Symptom(s) => s.date,
        }
    }
}
