use anyhow::{Context, Result};
use civicsync_core::remote::protocol::EnsureCalendar;
use google_calendar::types::{Calendar, CalendarListEntry, MinAccessRole};

use crate::commands::authed_client;

pub async fn handle(cmd: EnsureCalendar) -> Result<String> {
    let client = authed_client(cmd.account.as_deref()).await?;

    let calendars = client
        .calendar_list()
        .list_all(MinAccessRole::default(), false, false)
        .await
        .context("Failed to fetch calendars")?
        .body;

    if let Some(id) = existing_calendar(&calendars, cmd.calendar_id.as_deref(), &cmd.summary) {
        log::info!("Using existing calendar {}", id);
        return Ok(id);
    }

    if let Some(missing) = &cmd.calendar_id {
        log::warn!("Calendar {} not found or not writable, creating a new one", missing);
    }

    let created = client
        .calendars()
        .insert(&Calendar {
            conference_properties: None,
            description: cmd.description,
            etag: String::new(),
            id: String::new(),
            kind: String::new(),
            location: String::new(),
            summary: cmd.summary.clone(),
            time_zone: cmd.time_zone,
        })
        .await
        .with_context(|| format!("Failed to create calendar: {}", cmd.summary))?
        .body;

    log::info!("Created calendar {}", created.id);
    Ok(created.id)
}

/// The configured calendar if the account can write to it, else one the
/// account owns that already carries our summary.
fn existing_calendar(
    calendars: &[CalendarListEntry],
    configured: Option<&str>,
    summary: &str,
) -> Option<String> {
    let configured = configured.and_then(|id| {
        calendars
            .iter()
            .find(|cal| cal.id == id && matches!(cal.access_role.as_str(), "owner" | "writer"))
    });

    configured
        .or_else(|| {
            calendars
                .iter()
                .find(|cal| cal.summary == summary && cal.access_role == "owner")
        })
        .map(|cal| cal.id.clone())
}
