use anyhow::{Context, Result};
use civicsync_core::event::RemoteEvent;
use civicsync_core::remote::protocol::UpdateEvent;
use google_calendar::types::SendUpdates;

use crate::commands::authed_client;
use crate::google_event::{FromGoogle, ToGoogle};

pub async fn handle(cmd: UpdateEvent) -> Result<RemoteEvent> {
    let config = cmd.remote_config;
    let client = authed_client(config.account.as_deref()).await?;

    let mut google_event = cmd.event.to_google(&cmd.time_zone);
    google_event.id = cmd.event_id.clone();

    let response = client
        .events()
        .update(
            &config.calendar_id,
            &cmd.event_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &google_event,
        )
        .await
        .with_context(|| format!("Failed to update event: {}", &google_event.summary))?;

    RemoteEvent::from_google(response.body)
}
