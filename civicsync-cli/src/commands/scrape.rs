use std::path::PathBuf;

use anyhow::{Context, Result};
use civicsync_core::config::SyncConfig;
use owo_colors::OwoColorize;

use crate::commands::load_meetings;

pub async fn run(config: &SyncConfig, output: Option<PathBuf>) -> Result<()> {
    let meetings = load_meetings(config, None).await?;

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&meetings)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved {} meetings to {}", meetings.len(), path.display());
        return Ok(());
    }

    if meetings.is_empty() {
        println!("{}", "No meetings found.".yellow());
        return Ok(());
    }

    for meeting in &meetings {
        println!("{}", meeting.title.bold());
        println!(
            "   {} {}",
            meeting.date,
            meeting.time.as_deref().unwrap_or("(no time)").dimmed()
        );
        if let Some(location) = &meeting.location {
            println!("   {}", location.dimmed());
        }
        if let Some(board) = &meeting.board {
            println!("   {}", board.dimmed());
        }
    }

    println!("\n{} meetings", meetings.len());

    Ok(())
}
