//! Event types shared by the scraper, the reconciler and providers.
//!
//! A `RawMeeting` is what the scrape source yields, a `CanonicalEvent` is
//! its normalized form, and a `RemoteEvent` is what the remote calendar
//! already holds.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of a remote event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    /// Same point in time, compared within one representation only.
    ///
    /// Two timed values compare as instants, two all-day values compare as
    /// dates, and a timed value never equals an all-day one.
    pub fn same_as(&self, other: &EventTime) -> bool {
        match (self, other) {
            (EventTime::DateTime(a), EventTime::DateTime(b)) => a == b,
            (EventTime::Date(a), EventTime::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// A meeting as scraped from the municipal calendar page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeeting {
    pub title: String,
    /// Free-text date, e.g. "Wednesday, January 15, 2026"
    pub date: String,
    /// Free-text time, e.g. "7:00 PM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Board or committee badge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// Provenance of a canonical event. Never used for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceKey {
    /// Listing page the meeting was scraped from
    #[serde(default)]
    pub source_url: String,
    pub details_url: Option<String>,
    pub original_date: String,
    pub scraped_at: DateTime<Utc>,
}

/// A scraped meeting with its start and end resolved to absolute instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub source: SourceKey,
}

impl fmt::Display for CanonicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// An event that already exists in the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// Identifier assigned by the remote store
    pub id: String,
    pub title: String,
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl RemoteEvent {
    /// The remote event a store would hold right after writing `event`.
    pub fn from_canonical(id: impl Into<String>, event: &CanonicalEvent) -> Self {
        RemoteEvent {
            id: id.into(),
            title: event.title.clone(),
            start: EventTime::DateTime(event.start),
            end: Some(EventTime::DateTime(event.end)),
            description: Some(event.description.clone()),
            location: Some(event.location.clone()),
        }
    }
}

impl fmt::Display for RemoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
