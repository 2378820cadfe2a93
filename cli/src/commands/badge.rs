use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use ottrcal_core::badges::BadgeUnlockWatcher;
use ottrcal_core::progress::ProgressStore;

use crate::badgehub::BadgeHubClient;

use super::helpers::{category_label, json_error, truncate};

pub(crate) async fn cmd_badges_list(client: &BadgeHubClient, json: bool) -> Result<()> {
    let catalogue = client.fetch_catalogue_async().await?;

    if catalogue.is_empty() {
        if json {
            println!("{}", json_error("Badge catalogue is empty"));
        } else {
            eprintln!("Badge catalogue is empty");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&catalogue)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct BadgeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Requires")]
        requires: String,
        #[tabled(rename = "Description")]
        description: String,
    }

    let rows: Vec<BadgeRow> = catalogue
        .iter()
        .map(|b| BadgeRow {
            id: b.id.clone(),
            name: truncate(&b.name, 25),
            requires: format!("{} >= {}", category_label(b.category), b.threshold),
            description: truncate(&b.description, 40),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_badges_check(
    progress: &ProgressStore,
    client: &BadgeHubClient,
    user_id: &str,
    json: bool,
) -> Result<()> {
    let stats = progress.stats();
    let mut watcher = BadgeUnlockWatcher::new(user_id);

    // The backend trait is synchronous and bridges to async internally,
    // so the evaluation must run off the async executor thread.
    let newly_unlocked = tokio::task::block_in_place(|| {
        watcher.evaluate(client, &stats, |badge| {
            if !json {
                let name = &badge.name;
                let description = &badge.description;
                eprintln!("Badge unlocked: {name} ({description})");
            }
        })
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&newly_unlocked)?);
    } else if newly_unlocked.is_empty() {
        println!("No new badges unlocked.");
    } else {
        let count = newly_unlocked.len();
        println!("{count} new badge(s) unlocked!");
    }

    Ok(())
}
