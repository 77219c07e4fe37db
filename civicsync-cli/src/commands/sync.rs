use std::path::Path;

use anyhow::Result;
use civicsync_core::config::SyncConfig;
use civicsync_core::error::SyncError;
use civicsync_core::reconcile::Reconciler;
use civicsync_core::remote::Remote;
use owo_colors::OwoColorize;

use crate::commands::load_meetings;
use crate::render::{PlanRender, Render, calendar_settings_url, view_calendar_url};
use crate::utils::tui;

pub async fn run(config: &SyncConfig, from_file: Option<&Path>, verbose: bool) -> Result<()> {
    let meetings = load_meetings(config, from_file).await?;
    if meetings.is_empty() {
        println!("{}", "No meetings found. Nothing to sync.".yellow());
        return Ok(());
    }

    let spinner = tui::create_spinner("Connecting to calendar");
    let remote = Remote::connect(config).await;
    spinner.finish_and_clear();
    let remote = remote?;

    println!("📅 {}", remote.calendar_id());

    let reconciler = Reconciler::new(config);

    let spinner = tui::create_spinner("Loading calendar events");
    let plan = reconciler.prepare(&meetings, &remote).await;
    spinner.finish_and_clear();

    let plan = match plan {
        Ok(plan) => plan,
        Err(SyncError::SourceUnavailable(msg)) => {
            println!("{}", format!("Nothing to sync: {msg}").yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", plan.render(&config.timezone, verbose));

    let spinner = tui::create_spinner(format!("Applying {} changes", plan.mutations.len()));
    let summary = reconciler.apply(&plan, &remote).await;
    spinner.finish_and_clear();

    println!("\n{}", summary.render());

    println!(
        "\n🔗 View calendar: {}",
        view_calendar_url(remote.calendar_id())
    );

    if config.calendar_id.as_deref() != Some(remote.calendar_id()) {
        println!(
            "\n{}\n   calendar_id = \"{}\"",
            "Tip: add this to your civicsync config:".dimmed(),
            remote.calendar_id()
        );
        println!(
            "\n{}\n   1. Visit: {}\n   2. Scroll to \"Access permissions\"\n   3. Check \"Make available to public\"",
            "To make this calendar public:".dimmed(),
            calendar_settings_url(remote.calendar_id())
        );
    }

    if summary.has_failures() {
        for failure in &summary.failures {
            eprintln!("   {}", failure.to_string().red());
        }
        anyhow::bail!(
            "{} of {} changes failed",
            summary.failed,
            plan.mutations.len()
        );
    }

    Ok(())
}
