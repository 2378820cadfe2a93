use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// XP required to advance from level N to N+1 is `N * XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u32 = 100;
/// Flat XP for every food log.
pub const FOOD_LOG_XP: u32 = 10;
/// Flat XP for every water log.
pub const WATER_LOG_XP: u32 = 5;
/// Bonus XP when a food log lands the day in the perfect-day band.
pub const PERFECT_DAY_BONUS_XP: u32 = 50;
/// The quick-log cup size; also what `undo_last_water` subtracts.
pub const WATER_CUP_ML: f64 = 250.0;
/// Water intake is clamped at this multiple of the daily target.
pub const WATER_CLAMP_FACTOR: f64 = 1.5;
/// Perfect-day band: consumed calories within this percentage of target, inclusive.
pub const PERFECT_DAY_MIN_PCT: f64 = 95.0;
pub const PERFECT_DAY_MAX_PCT: f64 = 105.0;
/// The perfect-day bonus requires at least this many prior logs in the period.
pub const PERFECT_DAY_MIN_PRIOR_LOGS: usize = 2;

///// The full persisted unit of state: the day's nutrition and hydration
/// totals plus the long-lived gamification counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub calories_consumed: f64,
    pub calories_target: f64,
    pub protein_consumed: f64,
    pub protein_target: f64,
    pub carbs_consumed: f64,
    pub carbs_target: f64,
    pub fat_consumed: f64,
    pub fat_target: f64,
    pub water_consumed_ml: f64,
    pub water_target_ml: f64,
    pub xp: u32,
    pub level: u32,
    pub streak: u32,
    #[serde(default)]
    pub food_logs: Vec<FoodLogEntry>,
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_water_log_at: Option<String>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            calories_consumed: 0.0,
            calories_target: 2000.0,
            protein_consumed: 0.0,
            protein_target: 90.0,
            carbs_consumed: 0.0,
            carbs_target: 250.0,
            fat_consumed: 0.0,
            fat_target: 70.0,
            water_consumed_ml: 0.0,
            water_target_ml: 2000.0,
            xp: 0,
            level: 1,
            streak: 0,
            food_logs: Vec::new(),
            last_activity_date: None,
            last_water_log_at: None,
        }
    }
}

/// One logged food item. Append-only: entries are never edited, only
/// cleared en masse by the daily reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct NewFoodLog {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Partial update for the configured daily targets. `None` leaves the
/// existing value in place.
#[derive(Debug, Clone, Default)]
pub struct TargetUpdate {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub water_ml: Option<f64>,
}

/// Which stat a badge criterion is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Streak,
    Level,
    FoodLogCount,
    Xp,
}

/// An externally defined unlock rule, read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeCriterion {
    pub id: String,
    pub category: BadgeCategory,
    pub threshold: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Derived stats the badge watcher compares against criterion thresholds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressStats {
    pub xp: u32,
    pub level: u32,
    pub streak: u32,
    pub food_log_count: u32,
}

impl ProgressStats {
    #[must_use]
    pub fn value_for(&self, category: BadgeCategory) -> u32 {
        match category {
            BadgeCategory::Streak => self.streak,
            BadgeCategory::Level => self.level,
            BadgeCategory::FoodLogCount => self.food_log_count,
            BadgeCategory::Xp => self.xp,
        }
    }
}

/// Validate a food log before it touches any totals: name must not be
/// empty, every numeric field must be finite and non-negative.
pub fn validate_food_log(log: &NewFoodLog) -> Result<()> {
    if log.name.trim().is_empty() {
        bail!("Food name must not be empty");
    }
    for (field, value) in [
        ("calories", log.calories),
        ("protein", log.protein),
        ("carbs", log.carbs),
        ("fat", log.fat),
    ] {
        if !value.is_finite() {
            bail!("{field} must be a finite number");
        }
        if value < 0.0 {
            bail!("{field} must not be negative");
        }
    }
    Ok(())
}

/// Validate a water amount: finite and strictly positive.
pub fn validate_water_amount(ml: f64) -> Result<()> {
    if !ml.is_finite() {
        bail!("Water amount must be a finite number");
    }
    if ml <= 0.0 {
        bail!("Water amount must be greater than 0");
    }
    Ok(())
}

/// Validate a target update: every provided value must be finite and
/// strictly positive (a zero target would make remaining/clamp math
/// meaningless).
pub fn validate_target_update(update: &TargetUpdate) -> Result<()> {
    for (field, value) in [
        ("calories", update.calories),
        ("protein", update.protein_g),
        ("carbs", update.carbs_g),
        ("fat", update.fat_g),
        ("water", update.water_ml),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                bail!("{field} target must be a positive number");
            }
        }
    }
    Ok(())
}
