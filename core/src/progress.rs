use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    FOOD_LOG_XP, FoodLogEntry, NewFoodLog, PERFECT_DAY_BONUS_XP, PERFECT_DAY_MAX_PCT,
    PERFECT_DAY_MIN_PCT, PERFECT_DAY_MIN_PRIOR_LOGS, ProgressSnapshot, ProgressStats,
    TargetUpdate, WATER_CLAMP_FACTOR, WATER_CUP_ML, WATER_LOG_XP, XP_PER_LEVEL,
    validate_food_log, validate_target_update, validate_water_amount,
};
use crate::store::SnapshotStore;
use crate::streak::advance_streak;

/// Callback surface exposed upward to the UI layer. Invoked synchronously
/// at the point the relevant transition completes, so callers can render
/// celebrations without polling.
pub trait ProgressEvents {
    fn on_level_up(&self, _new_level: u32) {}
    fn on_streak_changed(&self, _new_streak: u32) {}
}

struct NoEvents;
impl ProgressEvents for NoEvents {}

/// Single source of truth for the day's nutrition, hydration and
/// gamification numbers. All mutations are synchronous and immediately
/// visible to subsequent reads; persistence is write-through best-effort
/// (a failed save is logged and never corrupts in-memory state).
pub struct ProgressStore {
    snapshot: ProgressSnapshot,
    store: Box<dyn SnapshotStore>,
    events: Box<dyn ProgressEvents>,
}

impl ProgressStore {
    /// Rehydrate from the store, or start fresh on first run.
    pub fn open(store: Box<dyn SnapshotStore>) -> Result<Self> {
        let snapshot = store.load()?.unwrap_or_default();
        Ok(Self {
            snapshot,
            store,
            events: Box::new(NoEvents),
        })
    }

    #[must_use]
    pub fn with_events(mut self, events: Box<dyn ProgressEvents>) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Log a food entry: append it, add its macros to the running totals,
    /// award the per-log XP (plus the perfect-day bonus when the day lands
    /// in band with enough prior logs — one combined cascade), and run the
    /// streak evaluation.
    pub fn log_food(&mut self, new: &NewFoodLog) -> Result<FoodLogEntry> {
        self.log_food_at(new, Local::now().date_naive())
    }

    /// `log_food` with "today" injected, so tests can pin dates.
    pub fn log_food_at(&mut self, new: &NewFoodLog, today: NaiveDate) -> Result<FoodLogEntry> {
        validate_food_log(new)?;

        let prior_logs = self.snapshot.food_logs.len();
        let entry = FoodLogEntry {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            calories: new.calories,
            protein: new.protein,
            carbs: new.carbs,
            fat: new.fat,
            timestamp: Local::now().to_rfc3339(),
        };
        self.snapshot.food_logs.push(entry.clone());
        self.snapshot.calories_consumed += new.calories;
        self.snapshot.protein_consumed += new.protein;
        self.snapshot.carbs_consumed += new.carbs;
        self.snapshot.fat_consumed += new.fat;

        let mut award = FOOD_LOG_XP;
        if prior_logs >= PERFECT_DAY_MIN_PRIOR_LOGS && self.is_perfect_day() {
            award += PERFECT_DAY_BONUS_XP;
        }
        self.apply_xp(award);
        self.run_streak(today);
        self.persist();
        Ok(entry)
    }

    /// True when consumed calories sit within the perfect-day band of the
    /// target, inclusive on both ends.
    fn is_perfect_day(&self) -> bool {
        if self.snapshot.calories_target <= 0.0 {
            return false;
        }
        let pct = self.snapshot.calories_consumed / self.snapshot.calories_target * 100.0;
        (PERFECT_DAY_MIN_PCT..=PERFECT_DAY_MAX_PCT).contains(&pct)
    }

    /// Log water intake, clamped at `WATER_CLAMP_FACTOR` times the daily
    /// target. Awards a small fixed XP but does not advance the streak;
    /// only food logging counts as streak activity.
    pub fn log_water(&mut self, ml: f64) -> Result<()> {
        validate_water_amount(ml)?;

        let cap = self.snapshot.water_target_ml * WATER_CLAMP_FACTOR;
        self.snapshot.water_consumed_ml = (self.snapshot.water_consumed_ml + ml).min(cap);
        self.snapshot.last_water_log_at = Some(Local::now().to_rfc3339());
        self.apply_xp(WATER_LOG_XP);
        self.persist();
        Ok(())
    }

    /// Blunt undo: subtract one fixed cup from the water total, floored at
    /// zero. Does not reverse a specific prior log. No-op when already at
    /// zero.
    pub fn undo_last_water(&mut self) {
        if self.snapshot.water_consumed_ml <= 0.0 {
            return;
        }
        self.snapshot.water_consumed_ml =
            (self.snapshot.water_consumed_ml - WATER_CUP_ML).max(0.0);
        self.persist();
    }

    /// Zero the day's consumed counters and clear the food log. Never
    /// touches xp, level, streak or targets. Callers detect the calendar
    /// rollover; this does not self-trigger.
    pub fn reset_daily_stats(&mut self) {
        self.snapshot.calories_consumed = 0.0;
        self.snapshot.protein_consumed = 0.0;
        self.snapshot.carbs_consumed = 0.0;
        self.snapshot.fat_consumed = 0.0;
        self.snapshot.water_consumed_ml = 0.0;
        self.snapshot.food_logs.clear();
        // The undo anchor points at a log the reset just wiped.
        self.snapshot.last_water_log_at = None;
        self.persist();
    }

    /// The single XP-mutation primitive: add `amount`, then cascade
    /// level-ups while `xp >= level * XP_PER_LEVEL`. Returns the XP total
    /// after all cascades.
    pub fn award_xp(&mut self, amount: u32) -> u32 {
        let xp = self.apply_xp(amount);
        self.persist();
        xp
    }

    fn apply_xp(&mut self, amount: u32) -> u32 {
        self.snapshot.xp += amount;
        let start_level = self.snapshot.level;
        while self.snapshot.xp >= self.snapshot.level * XP_PER_LEVEL {
            self.snapshot.xp -= self.snapshot.level * XP_PER_LEVEL;
            self.snapshot.level += 1;
        }
        if self.snapshot.level > start_level {
            self.events.on_level_up(self.snapshot.level);
        }
        self.snapshot.xp
    }

    fn run_streak(&mut self, today: NaiveDate) {
        let outcome = advance_streak(
            self.snapshot.streak,
            self.snapshot.last_activity_date,
            today,
        );
        self.snapshot.streak = outcome.streak;
        self.snapshot.last_activity_date = Some(outcome.last_activity_date);
        if outcome.streak_changed() {
            self.events.on_streak_changed(outcome.streak);
        }
    }

    /// Targets are configuration, adjusted by the wiring layer; core
    /// mutations never change them.
    pub fn set_targets(&mut self, update: &TargetUpdate) -> Result<()> {
        validate_target_update(update)?;
        if let Some(v) = update.calories {
            self.snapshot.calories_target = v;
        }
        if let Some(v) = update.protein_g {
            self.snapshot.protein_target = v;
        }
        if let Some(v) = update.carbs_g {
            self.snapshot.carbs_target = v;
        }
        if let Some(v) = update.fat_g {
            self.snapshot.fat_target = v;
        }
        if let Some(v) = update.water_ml {
            self.snapshot.water_target_ml = v;
        }
        self.persist();
        Ok(())
    }

    #[must_use]
    pub fn xp_for_next_level(&self) -> u32 {
        self.snapshot.level * XP_PER_LEVEL
    }

    #[must_use]
    pub fn calories_remaining(&self) -> f64 {
        (self.snapshot.calories_target - self.snapshot.calories_consumed).max(0.0)
    }

    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        ProgressStats {
            xp: self.snapshot.xp,
            level: self.snapshot.level,
            streak: self.snapshot.streak,
            food_log_count: self.snapshot.food_logs.len() as u32,
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.snapshot) {
            warn!("failed to persist progress snapshot: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::store::MemoryStore;

    fn sample_log(calories: f64) -> NewFoodLog {
        NewFoodLog {
            name: "Test Food".to_string(),
            calories,
            protein: 10.0,
            carbs: 20.0,
            fat: 5.0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open_store() -> ProgressStore {
        ProgressStore::open(Box::new(MemoryStore::new())).unwrap()
    }

    struct SharedStore(Arc<MemoryStore>);

    impl SnapshotStore for SharedStore {
        fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
            self.0.save(snapshot)
        }
        fn load(&self) -> Result<Option<ProgressSnapshot>> {
            self.0.load()
        }
    }

    #[test]
    fn test_award_xp_single_level_up() {
        let mut store = open_store();
        store.award_xp(90);
        assert_eq!(store.snapshot().xp, 90);
        assert_eq!(store.snapshot().level, 1);

        // 90 + 25 = 115 >= 100, rolls over to level 2 with 15 left
        let xp = store.award_xp(25);
        assert_eq!(xp, 15);
        assert_eq!(store.snapshot().level, 2);
        assert!(store.snapshot().xp < store.xp_for_next_level());
    }

    #[test]
    fn test_award_xp_cascades_multiple_levels() {
        let mut store = open_store();
        // Level 1 needs 100, level 2 needs 200: 350 total lands at level 3
        // with 50 left over.
        let xp = store.award_xp(350);
        assert_eq!(store.snapshot().level, 3);
        assert_eq!(xp, 50);
    }

    #[test]
    fn test_xp_conservation_across_cascade() {
        let mut store = open_store();
        let amount = 1234;
        store.award_xp(amount);

        // Sum of thresholds spent climbing from level 1 plus the remainder
        // must equal the total awarded.
        let snap = store.snapshot();
        let spent: u32 = (1..snap.level).map(|l| l * XP_PER_LEVEL).sum();
        assert_eq!(spent + snap.xp, amount);
        assert!(snap.xp < snap.level * XP_PER_LEVEL);
    }

    #[test]
    fn test_log_food_updates_totals_and_xp() {
        let mut store = open_store();
        let entry = store
            .log_food_at(&sample_log(400.0), day(2024, 6, 15))
            .unwrap();
        assert!(!entry.id.is_empty());

        let snap = store.snapshot();
        assert!((snap.calories_consumed - 400.0).abs() < f64::EPSILON);
        assert!((snap.protein_consumed - 10.0).abs() < f64::EPSILON);
        assert_eq!(snap.xp, FOOD_LOG_XP);
        assert_eq!(snap.food_logs.len(), 1);
    }

    #[test]
    fn test_log_food_rejects_invalid_input_without_side_effects() {
        let mut store = open_store();
        let mut bad = sample_log(100.0);
        bad.calories = -5.0;
        assert!(store.log_food_at(&bad, day(2024, 6, 15)).is_err());

        let snap = store.snapshot();
        assert_eq!(snap.food_logs.len(), 0);
        assert!((snap.calories_consumed - 0.0).abs() < f64::EPSILON);
        assert_eq!(snap.xp, 0);
    }

    #[test]
    fn test_perfect_day_bonus_awarded_once_in_band() {
        let mut store = open_store();
        let today = day(2024, 6, 15);
        // Target 2000: two logs totalling 1900, third of 60 lands at 1960
        // which is 98%, in [95, 105], with 2 prior logs.
        store.log_food_at(&sample_log(1000.0), today).unwrap();
        store.log_food_at(&sample_log(900.0), today).unwrap();
        store.log_food_at(&sample_log(60.0), today).unwrap();

        // Exactly one flat award per log plus one bonus for the third.
        let snap = store.snapshot();
        let total = snap.xp + (1..snap.level).map(|l| l * XP_PER_LEVEL).sum::<u32>();
        assert_eq!(total, 3 * FOOD_LOG_XP + PERFECT_DAY_BONUS_XP);
    }

    #[test]
    fn test_perfect_day_bonus_needs_two_prior_logs() {
        let mut store = open_store();
        let today = day(2024, 6, 15);
        // Lands in band (2000/2000 = 100%) but only 1 prior log.
        store.log_food_at(&sample_log(1000.0), today).unwrap();
        store.log_food_at(&sample_log(1000.0), today).unwrap();

        let snap = store.snapshot();
        let total = snap.xp + (1..snap.level).map(|l| l * XP_PER_LEVEL).sum::<u32>();
        assert_eq!(total, 2 * FOOD_LOG_XP);
    }

    #[test]
    fn test_perfect_day_bonus_not_awarded_out_of_band() {
        let mut store = open_store();
        let today = day(2024, 6, 15);
        store.log_food_at(&sample_log(500.0), today).unwrap();
        store.log_food_at(&sample_log(500.0), today).unwrap();
        // 1500/2000 = 75%, below the band despite 2 prior logs.
        store.log_food_at(&sample_log(500.0), today).unwrap();

        let snap = store.snapshot();
        let total = snap.xp + (1..snap.level).map(|l| l * XP_PER_LEVEL).sum::<u32>();
        assert_eq!(total, 3 * FOOD_LOG_XP);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let mut store = open_store();
        let start = day(2024, 3, 1);
        for i in 0..5 {
            store
                .log_food_at(&sample_log(100.0), start + Duration::days(i))
                .unwrap();
        }
        // First day anchors without counting; four extensions follow.
        assert_eq!(store.snapshot().streak, 4);
    }

    #[test]
    fn test_streak_same_day_logs_change_nothing() {
        let mut store = open_store();
        let today = day(2024, 6, 15);
        for _ in 0..4 {
            store.log_food_at(&sample_log(100.0), today).unwrap();
        }
        assert_eq!(store.snapshot().streak, 0);
        assert_eq!(store.snapshot().last_activity_date, Some(today));
    }

    #[test]
    fn test_streak_gentle_reset_after_gap() {
        let mut store = open_store();
        let start = day(2024, 6, 1);
        store.log_food_at(&sample_log(100.0), start).unwrap();
        store
            .log_food_at(&sample_log(100.0), start + Duration::days(1))
            .unwrap();
        assert_eq!(store.snapshot().streak, 1);

        // Five silent days, then one log: streak is exactly 1.
        store
            .log_food_at(&sample_log(100.0), start + Duration::days(6))
            .unwrap();
        assert_eq!(store.snapshot().streak, 1);
    }

    #[test]
    fn test_water_clamp_never_exceeded() {
        let mut store = open_store();
        let cap = store.snapshot().water_target_ml * WATER_CLAMP_FACTOR;
        for _ in 0..50 {
            store.log_water(500.0).unwrap();
        }
        assert!((store.snapshot().water_consumed_ml - cap).abs() < f64::EPSILON);
    }

    #[test]
    fn test_water_awards_xp_but_not_streak() {
        let mut store = open_store();
        store.log_water(250.0).unwrap();
        assert_eq!(store.snapshot().xp, WATER_LOG_XP);
        assert_eq!(store.snapshot().streak, 0);
        assert!(store.snapshot().last_activity_date.is_none());
        assert!(store.snapshot().last_water_log_at.is_some());
    }

    #[test]
    fn test_undo_water_floors_at_zero() {
        let mut store = open_store();
        store.log_water(100.0).unwrap();
        store.undo_last_water();
        assert!((store.snapshot().water_consumed_ml - 0.0).abs() < f64::EPSILON);

        // Already zero: no-op, no underflow.
        store.undo_last_water();
        assert!((store.snapshot().water_consumed_ml - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_undo_water_subtracts_one_cup() {
        let mut store = open_store();
        store.log_water(800.0).unwrap();
        store.undo_last_water();
        assert!((store.snapshot().water_consumed_ml - (800.0 - WATER_CUP_ML)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_clears_day_but_keeps_gamification() {
        let mut store = open_store();
        let today = day(2024, 6, 15);
        store.log_food_at(&sample_log(1500.0), today).unwrap();
        store.log_water(500.0).unwrap();
        store.award_xp(250);

        let level = store.snapshot().level;
        let xp = store.snapshot().xp;
        let streak = store.snapshot().streak;

        store.reset_daily_stats();
        let snap = store.snapshot();
        assert!((snap.calories_consumed - 0.0).abs() < f64::EPSILON);
        assert!((snap.water_consumed_ml - 0.0).abs() < f64::EPSILON);
        assert!(snap.food_logs.is_empty());
        assert!(snap.last_water_log_at.is_none());
        assert_eq!(snap.level, level);
        assert_eq!(snap.xp, xp);
        assert_eq!(snap.streak, streak);
        assert!((snap.calories_target - 2000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let backing = Arc::new(MemoryStore::new());
        backing.set_fail_saves(true);
        let mut store = ProgressStore::open(Box::new(SharedStore(Arc::clone(&backing)))).unwrap();

        store
            .log_food_at(&sample_log(300.0), day(2024, 6, 15))
            .unwrap();

        // Save failed, but the in-memory snapshot is authoritative.
        assert_eq!(store.snapshot().food_logs.len(), 1);
        assert!(backing.saved().is_none());
    }

    #[test]
    fn test_rehydrates_from_store() {
        let backing = Arc::new(MemoryStore::new());
        {
            let mut store =
                ProgressStore::open(Box::new(SharedStore(Arc::clone(&backing)))).unwrap();
            store.award_xp(150);
        }
        let store = ProgressStore::open(Box::new(SharedStore(backing))).unwrap();
        assert_eq!(store.snapshot().level, 2);
        assert_eq!(store.snapshot().xp, 50);
    }

    #[test]
    fn test_level_up_callback_fires_once_per_cascade() {
        struct Counter(Rc<Cell<u32>>, Rc<Cell<u32>>);
        impl ProgressEvents for Counter {
            fn on_level_up(&self, new_level: u32) {
                self.0.set(self.0.get() + 1);
                self.1.set(new_level);
            }
        }

        let calls = Rc::new(Cell::new(0));
        let last_level = Rc::new(Cell::new(0));
        let mut store = open_store().with_events(Box::new(Counter(
            Rc::clone(&calls),
            Rc::clone(&last_level),
        )));

        // 100 + 200 + 50: jumps two levels in one award.
        store.award_xp(350);
        assert_eq!(calls.get(), 1);
        assert_eq!(last_level.get(), 3);
    }

    #[test]
    fn test_streak_callback_fires_on_change_only() {
        struct Counter(Rc<Cell<u32>>);
        impl ProgressEvents for Counter {
            fn on_streak_changed(&self, _new_streak: u32) {
                self.0.set(self.0.get() + 1);
            }
        }

        let calls = Rc::new(Cell::new(0));
        let mut store = open_store().with_events(Box::new(Counter(Rc::clone(&calls))));

        let today = day(2024, 6, 15);
        store.log_food_at(&sample_log(100.0), today).unwrap();
        store.log_food_at(&sample_log(100.0), today).unwrap();
        assert_eq!(calls.get(), 0, "anchor and same-day logs do not fire");

        store
            .log_food_at(&sample_log(100.0), today + Duration::days(1))
            .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_set_targets_partial_update() {
        let mut store = open_store();
        store
            .set_targets(&TargetUpdate {
                calories: Some(1800.0),
                water_ml: Some(2500.0),
                ..TargetUpdate::default()
            })
            .unwrap();
        let snap = store.snapshot();
        assert!((snap.calories_target - 1800.0).abs() < f64::EPSILON);
        assert!((snap.water_target_ml - 2500.0).abs() < f64::EPSILON);
        assert!((snap.protein_target - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_calories_remaining_floors_at_zero() {
        let mut store = open_store();
        assert!((store.calories_remaining() - 2000.0).abs() < f64::EPSILON);
        store
            .log_food_at(&sample_log(2500.0), day(2024, 6, 15))
            .unwrap();
        assert!((store.calories_remaining() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_xp_for_next_level_tracks_level() {
        let mut store = open_store();
        assert_eq!(store.xp_for_next_level(), XP_PER_LEVEL);
        store.award_xp(100);
        assert_eq!(store.xp_for_next_level(), 2 * XP_PER_LEVEL);
    }
}
