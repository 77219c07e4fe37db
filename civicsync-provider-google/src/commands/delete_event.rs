use anyhow::{Context, Result};
use civicsync_core::remote::protocol::DeleteEvent;
use google_calendar::types::SendUpdates;

use crate::commands::authed_client;

pub async fn handle(cmd: DeleteEvent) -> Result<()> {
    let config = cmd.remote_config;
    let client = authed_client(config.account.as_deref()).await?;

    let result = client
        .events()
        .delete(&config.calendar_id, &cmd.event_id, false, SendUpdates::None)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            let error_str = e.to_string();
            // Already gone counts as deleted
            if error_str.contains("410") || error_str.contains("Gone") {
                Ok(())
            } else {
                Err(e).with_context(|| format!("Failed to delete event: {}", cmd.event_id))
            }
        }
    }
}
