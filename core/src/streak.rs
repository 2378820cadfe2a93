use chrono::NaiveDate;
use tracing::warn;

/// What a streak evaluation decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakDecision {
    /// First-ever activity: anchor the date, streak stays where it is.
    Started,
    /// Already logged today (or clock skew): nothing changes.
    Unchanged,
    /// Consecutive day: streak grows by one.
    Extended,
    /// Gap of more than one day: streak restarts at one.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    pub streak: u32,
    pub last_activity_date: NaiveDate,
    pub decision: StreakDecision,
}

impl StreakOutcome {
    /// True when the streak counter itself moved.
    #[must_use]
    pub fn streak_changed(&self) -> bool {
        matches!(self.decision, StreakDecision::Extended | StreakDecision::Reset)
    }
}

/// Advance a streak given the previous anchor date and "today".
///
/// Pure over its inputs: callers supply `today` (day granularity, local
/// wall-clock date) so this can be tested without touching the clock.
/// A negative day difference means the clock went backwards; that is
/// treated as a same-day no-op and logged, never a crash.
#[must_use]
pub fn advance_streak(
    streak: u32,
    last_activity: Option<NaiveDate>,
    today: NaiveDate,
) -> StreakOutcome {
    let Some(last) = last_activity else {
        return StreakOutcome {
            streak,
            last_activity_date: today,
            decision: StreakDecision::Started,
        };
    };

    let diff_days = (today - last).num_days();
    match diff_days {
        0 => StreakOutcome {
            streak,
            last_activity_date: last,
            decision: StreakDecision::Unchanged,
        },
        1 => StreakOutcome {
            streak: streak + 1,
            last_activity_date: today,
            decision: StreakDecision::Extended,
        },
        d if d > 1 => StreakOutcome {
            streak: 1,
            last_activity_date: today,
            decision: StreakDecision::Reset,
        },
        _ => {
            warn!(
                "clock skew: last activity {last} is after today {today}, leaving streak untouched"
            );
            StreakOutcome {
                streak,
                last_activity_date: last,
                decision: StreakDecision::Unchanged,
            }
        }
    }
}
