use anyhow::Result;
use serde::Serialize;

use ottrcal_core::models::{WATER_CLAMP_FACTOR, WATER_CUP_ML};
use ottrcal_core::progress::ProgressStore;

#[derive(Serialize)]
struct WaterResult {
    water_consumed_ml: f64,
    water_target_ml: f64,
    xp: u32,
    level: u32,
}

fn print_water(progress: &ProgressStore, json: bool) -> Result<()> {
    let snap = progress.snapshot();
    if json {
        let result = WaterResult {
            water_consumed_ml: snap.water_consumed_ml,
            water_target_ml: snap.water_target_ml,
            xp: snap.xp,
            level: snap.level,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let consumed = snap.water_consumed_ml;
        let target = snap.water_target_ml;
        println!("Water today: {consumed:.0}/{target:.0} ml");
    }
    Ok(())
}

pub(crate) fn cmd_water_log(progress: &mut ProgressStore, ml: f64, json: bool) -> Result<()> {
    progress.log_water(ml)?;

    let snap = progress.snapshot();
    let cap = snap.water_target_ml * WATER_CLAMP_FACTOR;
    if (snap.water_consumed_ml - cap).abs() < f64::EPSILON {
        eprintln!("Note: water intake capped at {cap:.0} ml for today");
    }
    print_water(progress, json)
}

pub(crate) fn cmd_water_undo(progress: &mut ProgressStore, json: bool) -> Result<()> {
    if progress.snapshot().water_consumed_ml <= 0.0 {
        if !json {
            eprintln!("Water already at 0 — nothing to undo");
        }
        return print_water(progress, json);
    }

    progress.undo_last_water();
    if !json {
        eprintln!("Removed one cup ({WATER_CUP_ML:.0} ml)");
    }
    print_water(progress, json)
}
