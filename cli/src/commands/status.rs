use anyhow::Result;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use ottrcal_core::progress::ProgressStore;

use super::helpers::{truncate, xp_bar};

#[derive(Serialize)]
struct StatusReport {
    calories_consumed: f64,
    calories_target: f64,
    calories_remaining: f64,
    protein_consumed: f64,
    protein_target: f64,
    carbs_consumed: f64,
    carbs_target: f64,
    fat_consumed: f64,
    fat_target: f64,
    water_consumed_ml: f64,
    water_target_ml: f64,
    xp: u32,
    xp_for_next_level: u32,
    level: u32,
    streak: u32,
    food_log_count: usize,
}

pub(crate) fn cmd_status(progress: &ProgressStore, json: bool) -> Result<()> {
    let snap = progress.snapshot();

    if json {
        let report = StatusReport {
            calories_consumed: snap.calories_consumed,
            calories_target: snap.calories_target,
            calories_remaining: progress.calories_remaining(),
            protein_consumed: snap.protein_consumed,
            protein_target: snap.protein_target,
            carbs_consumed: snap.carbs_consumed,
            carbs_target: snap.carbs_target,
            fat_consumed: snap.fat_consumed,
            fat_target: snap.fat_target,
            water_consumed_ml: snap.water_consumed_ml,
            water_target_ml: snap.water_target_ml,
            xp: snap.xp,
            xp_for_next_level: progress.xp_for_next_level(),
            level: snap.level,
            streak: snap.streak,
            food_log_count: snap.food_logs.len(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let level = snap.level;
    let streak = snap.streak;
    let bar = xp_bar(snap.xp, progress.xp_for_next_level());
    println!("Level {level}  {bar}  |  streak: {streak} days\n");

    let cal = snap.calories_consumed;
    let cal_t = snap.calories_target;
    let remaining = progress.calories_remaining();
    println!("  CALORIES: {cal:.0}/{cal_t:.0} kcal ({remaining:.0} remaining)");
    let p = snap.protein_consumed;
    let pt = snap.protein_target;
    let c = snap.carbs_consumed;
    let ct = snap.carbs_target;
    let f = snap.fat_consumed;
    let ft = snap.fat_target;
    println!("  MACROS:   P:{p:.0}/{pt:.0}g C:{c:.0}/{ct:.0}g F:{f:.0}/{ft:.0}g");
    let w = snap.water_consumed_ml;
    let wt = snap.water_target_ml;
    println!("  WATER:    {w:.0}/{wt:.0} ml\n");

    if snap.food_logs.is_empty() {
        println!("  No food logged yet today.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct LogRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "kcal")]
        calories: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
    }

    let rows: Vec<LogRow> = snap
        .food_logs
        .iter()
        .map(|e| LogRow {
            name: truncate(&e.name, 35),
            calories: format!("{:.0}", e.calories),
            protein: format!("{:.0}g", e.protein),
            carbs: format!("{:.0}g", e.carbs),
            fat: format!("{:.0}g", e.fat),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_reset(progress: &mut ProgressStore, json: bool) -> Result<()> {
    progress.reset_daily_stats();

    if json {
        println!("{}", serde_json::to_string_pretty(progress.snapshot())?);
    } else {
        let snap = progress.snapshot();
        let level = snap.level;
        let streak = snap.streak;
        println!("Daily stats reset. Level {level} and {streak}-day streak kept.");
    }
    Ok(())
}
