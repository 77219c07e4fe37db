pub mod authenticate;
pub mod create_event;
pub mod delete_event;
pub mod ensure_calendar;
pub mod list_events;
pub mod update_event;

use anyhow::Result;
use google_calendar::Client;

use crate::session::Session;

/// API client for `account` (or the only stored account), with a fresh token.
pub async fn authed_client(account: Option<&str>) -> Result<Client> {
    Session::load_valid(account).await?.client()
}
