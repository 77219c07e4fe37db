pub mod auth;
pub mod config;
pub mod scrape;
pub mod status;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};
use civicsync_core::config::SyncConfig;
use civicsync_core::event::RawMeeting;
use civicsync_core::store::{JsonFileSource, MeetingSource};

use crate::scrape::CalendarPage;
use crate::utils::tui;

/// Meetings from a saved scrape, or freshly scraped from the calendar page.
pub async fn load_meetings(config: &SyncConfig, from_file: Option<&Path>) -> Result<Vec<RawMeeting>> {
    match from_file {
        Some(path) => JsonFileSource::new(path)
            .fetch()
            .await
            .with_context(|| format!("Failed to load meetings from {}", path.display())),
        None => {
            let source = CalendarPage::new(config)?;
            let spinner = tui::create_spinner(format!("Scraping {}", config.source_url));
            let result = source.fetch().await;
            spinner.finish_and_clear();
            Ok(result?)
        }
    }
}
