//! Collaborator interfaces consumed by the reconciler.

#![allow(async_fn_in_trait)]

use std::path::PathBuf;

use crate::error::{SyncError, SyncResult};
use crate::event::{CanonicalEvent, RawMeeting, RemoteEvent};
use crate::window::SyncWindow;

/// A remote calendar the reconciler mirrors meetings into.
pub trait EventStore {
    /// Events whose start lies inside `window`.
    async fn list(&self, window: &SyncWindow) -> SyncResult<Vec<RemoteEvent>>;

    async fn create(&self, event: &CanonicalEvent) -> SyncResult<RemoteEvent>;

    async fn update(&self, id: &str, event: &CanonicalEvent) -> SyncResult<RemoteEvent>;

    async fn delete(&self, id: &str) -> SyncResult<()>;
}

/// Something that yields scraped meetings.
pub trait MeetingSource {
    /// Scraped meetings in page order. May be empty.
    async fn fetch(&self) -> SyncResult<Vec<RawMeeting>>;
}

/// Reads meetings from a JSON array of [`RawMeeting`], e.g. a saved scrape.
pub struct JsonFileSource {
    pub path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }
}

impl MeetingSource for JsonFileSource {
    async fn fetch(&self) -> SyncResult<Vec<RawMeeting>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::SourceUnavailable(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SyncError::Serialization(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }
}
