use std::path::Path;

use anyhow::Result;
use civicsync_core::config::SyncConfig;
use civicsync_core::error::{SyncError, SyncResult};
use civicsync_core::event::{CanonicalEvent, RemoteEvent};
use civicsync_core::reconcile::Reconciler;
use civicsync_core::remote::Remote;
use civicsync_core::store::EventStore;
use civicsync_core::window::SyncWindow;
use owo_colors::OwoColorize;

use crate::commands::load_meetings;
use crate::render::PlanRender;
use crate::utils::tui;

/// Stands in for the calendar before one has been created.
struct Unconfigured;

impl EventStore for Unconfigured {
    async fn list(&self, _window: &SyncWindow) -> SyncResult<Vec<RemoteEvent>> {
        Ok(Vec::new())
    }

    async fn create(&self, _event: &CanonicalEvent) -> SyncResult<RemoteEvent> {
        Err(SyncError::Config("No calendar configured".into()))
    }

    async fn update(&self, _id: &str, _event: &CanonicalEvent) -> SyncResult<RemoteEvent> {
        Err(SyncError::Config("No calendar configured".into()))
    }

    async fn delete(&self, _id: &str) -> SyncResult<()> {
        Err(SyncError::Config("No calendar configured".into()))
    }
}

/// Show what a sync would change, without changing anything.
pub async fn run(config: &SyncConfig, from_file: Option<&Path>, verbose: bool) -> Result<()> {
    let meetings = load_meetings(config, from_file).await?;
    if meetings.is_empty() {
        println!("{}", "No meetings found. Nothing to sync.".yellow());
        return Ok(());
    }

    let reconciler = Reconciler::new(config);

    let plan = match Remote::from_config(config) {
        Some(remote) => {
            println!("📅 {}", remote.calendar_id());
            let spinner = tui::create_spinner("Loading calendar events");
            let result = reconciler.prepare(&meetings, &remote).await;
            spinner.finish_and_clear();
            result
        }
        None => {
            println!(
                "📅 {}",
                "No calendar yet (one is created on the first sync)".dimmed()
            );
            reconciler.prepare(&meetings, &Unconfigured).await
        }
    };

    let plan = match plan {
        Ok(plan) => plan,
        Err(SyncError::SourceUnavailable(msg)) => {
            println!("{}", format!("Nothing to sync: {msg}").yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", plan.render(&config.timezone, verbose));

    if plan.invalid > 0 {
        println!(
            "\n{}",
            format!("{} meetings skipped (unreadable date)", plan.invalid).yellow()
        );
    }

    Ok(())
}
