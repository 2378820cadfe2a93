mod badgehub;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::badgehub::BadgeHubClient;
use crate::commands::{
    CliEvents, cmd_badges_check, cmd_badges_list, cmd_log, cmd_reset, cmd_status, cmd_target_set,
    cmd_target_show, cmd_water_log, cmd_water_undo,
};
use crate::config::Config;
use ottrcal_core::progress::ProgressStore;
use ottrcal_core::store::JsonFileStore;

#[derive(Parser)]
#[command(
    name = "ottrcal",
    version,
    about = "A gamified nutrition and wellness tracker",
    long_about = "\n\n   ottrcal — log meals and water, keep your streak alive,\n   level up, and earn badges along the way.\n"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a food entry with its macros
    Log {
        /// Food name
        name: String,
        /// Calories in the entry
        #[arg(long)]
        calories: f64,
        /// Protein in grams
        #[arg(short, long, default_value = "0")]
        protein: f64,
        /// Carbs in grams
        #[arg(short, long, default_value = "0")]
        carbs: f64,
        /// Fat in grams
        #[arg(short, long, default_value = "0")]
        fat: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Track water intake
    Water {
        #[command(subcommand)]
        command: WaterCommands,
    },
    /// Show today's progress, XP and streak
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reset today's consumed totals (XP, level and streak are kept)
    Reset {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse and check badges (requires OTTRCAL_BADGE_URL)
    Badges {
        #[command(subcommand)]
        command: BadgeCommands,
    },
    /// Manage daily nutrition and water targets
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },
}

#[derive(Subcommand)]
enum WaterCommands {
    /// Log water intake in millilitres
    Log {
        /// Amount in ml
        ml: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the last cup (250 ml) of water
    Undo {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BadgeCommands {
    /// List the badge catalogue
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare progress against the catalogue and unlock earned badges
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TargetCommands {
    /// Set one or more daily targets
    Set {
        /// Daily calorie target (kcal)
        #[arg(long)]
        calories: Option<f64>,
        /// Daily protein target (g)
        #[arg(long)]
        protein: Option<f64>,
        /// Daily carbs target (g)
        #[arg(long)]
        carbs: Option<f64>,
        /// Daily fat target (g)
        #[arg(long)]
        fat: Option<f64>,
        /// Daily water target (ml)
        #[arg(long)]
        water: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the configured targets
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let store = JsonFileStore::new(config.snapshot_path.clone());
    let mut progress = ProgressStore::open(Box::new(store))?.with_events(Box::new(CliEvents));

    match cli.command {
        Commands::Log {
            name,
            calories,
            protein,
            carbs,
            fat,
            json,
        } => cmd_log(&mut progress, &name, calories, protein, carbs, fat, json),
        Commands::Water { command } => match command {
            WaterCommands::Log { ml, json } => cmd_water_log(&mut progress, ml, json),
            WaterCommands::Undo { json } => cmd_water_undo(&mut progress, json),
        },
        Commands::Status { json } => cmd_status(&progress, json),
        Commands::Reset { json } => cmd_reset(&mut progress, json),
        Commands::Badges { command } => {
            let base_url = config
                .badge_service_url
                .as_deref()
                .context("No badge service configured. Set OTTRCAL_BADGE_URL to its base URL")?;
            let client = BadgeHubClient::new(base_url);
            match command {
                BadgeCommands::List { json } => cmd_badges_list(&client, json).await,
                BadgeCommands::Check { json } => {
                    let user_id = config.load_or_create_user_id()?;
                    cmd_badges_check(&progress, &client, &user_id, json)
                }
            }
        }
        Commands::Target { command } => match command {
            TargetCommands::Set {
                calories,
                protein,
                carbs,
                fat,
                water,
                json,
            } => cmd_target_set(&mut progress, calories, protein, carbs, fat, water, json),
            TargetCommands::Show { json } => cmd_target_show(&progress, json),
        },
    }
}
