use anyhow::Result;
use serde::Serialize;

use ottrcal_core::models::NewFoodLog;
use ottrcal_core::progress::ProgressStore;

#[derive(Serialize)]
struct LogResult<'a> {
    entry: &'a ottrcal_core::models::FoodLogEntry,
    calories_consumed: f64,
    calories_remaining: f64,
    xp: u32,
    level: u32,
    streak: u32,
}

pub(crate) fn cmd_log(
    progress: &mut ProgressStore,
    name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    json: bool,
) -> Result<()> {
    let entry = progress.log_food(&NewFoodLog {
        name: name.to_string(),
        calories,
        protein,
        carbs,
        fat,
    })?;

    let snap = progress.snapshot();
    if json {
        let result = LogResult {
            entry: &entry,
            calories_consumed: snap.calories_consumed,
            calories_remaining: progress.calories_remaining(),
            xp: snap.xp,
            level: snap.level,
            streak: snap.streak,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let remaining = progress.calories_remaining();
        println!(
            "Logged: {name} — {calories:.0} kcal | P:{protein:.0}g C:{carbs:.0}g F:{fat:.0}g"
        );
        println!("Remaining today: {remaining:.0} kcal");
    }

    Ok(())
}
