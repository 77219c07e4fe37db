use anyhow::{Context, Result};
use civicsync_core::event::RemoteEvent;
use civicsync_core::remote::protocol::ListEvents;
use google_calendar::types::OrderBy;

use crate::commands::authed_client;
use crate::google_event::{FromGoogle, is_cancelled};

pub async fn handle(cmd: ListEvents) -> Result<Vec<RemoteEvent>> {
    let config = cmd.remote_config;
    let client = authed_client(config.account.as_deref()).await?;

    let response = client
        .events()
        .list_all(
            &config.calendar_id,
            "",
            0,
            OrderBy::default(),
            &[],
            "", // search query
            &[],
            false,
            false,
            false,
            &cmd.to,
            &cmd.from,
            "",
            "",
        )
        .await
        .context("Failed to fetch events")?;

    let events = response
        .body
        .into_iter()
        .filter(|event| !is_cancelled(event))
        .filter_map(|event| match RemoteEvent::from_google(event) {
            Ok(remote) => Some(remote),
            Err(e) => {
                log::warn!("Skipping event: {:#}", e);
                None
            }
        })
        .collect();

    Ok(events)
}
