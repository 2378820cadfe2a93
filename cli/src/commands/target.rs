use anyhow::{Result, bail};
use serde::Serialize;

use ottrcal_core::models::TargetUpdate;
use ottrcal_core::progress::ProgressStore;

#[derive(Serialize)]
struct TargetReport {
    calories: f64,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
    water_ml: f64,
}

fn print_targets(progress: &ProgressStore, json: bool) -> Result<()> {
    let snap = progress.snapshot();
    let report = TargetReport {
        calories: snap.calories_target,
        protein_g: snap.protein_target,
        carbs_g: snap.carbs_target,
        fat_g: snap.fat_target,
        water_ml: snap.water_target_ml,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let cal = report.calories;
        let p = report.protein_g;
        let c = report.carbs_g;
        let f = report.fat_g;
        let w = report.water_ml;
        println!("Daily targets: {cal:.0} kcal | P:{p:.0}g C:{c:.0}g F:{f:.0}g | water {w:.0} ml");
    }
    Ok(())
}

pub(crate) fn cmd_target_set(
    progress: &mut ProgressStore,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    water: Option<f64>,
    json: bool,
) -> Result<()> {
    let update = TargetUpdate {
        calories,
        protein_g: protein,
        carbs_g: carbs,
        fat_g: fat,
        water_ml: water,
    };
    if update.calories.is_none()
        && update.protein_g.is_none()
        && update.carbs_g.is_none()
        && update.fat_g.is_none()
        && update.water_ml.is_none()
    {
        bail!("Nothing to set. Provide at least one of --calories, --protein, --carbs, --fat, --water");
    }

    progress.set_targets(&update)?;
    print_targets(progress, json)
}

pub(crate) fn cmd_target_show(progress: &ProgressStore, json: bool) -> Result<()> {
    print_targets(progress, json)
}
