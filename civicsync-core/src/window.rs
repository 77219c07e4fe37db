//! Time window of remote events considered by a sync pass.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::event::{CanonicalEvent, EventTime};
use crate::normalize::resolve_local;

/// Inclusive range of remote event starts a pass loads and may delete from.
///
/// Remote events outside the window are never evaluated, so a meeting that
/// simply fell off the scraped page isn't treated as cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl SyncWindow {
    /// Window spanning the earliest to latest canonical start, padded on both sides.
    /// Returns `None` when there are no events.
    pub fn around(events: &[CanonicalEvent], padding: Duration) -> Option<Self> {
        let min = events.iter().map(|e| e.start).min()?;
        let max = events.iter().map(|e| e.start).max()?;

        Some(SyncWindow {
            time_min: min - padding,
            time_max: max + padding,
        })
    }

    /// Whether an event starting at `start` falls inside the window.
    /// All-day starts are taken as local midnight in `tz`.
    pub fn contains(&self, start: &EventTime, tz: &Tz) -> bool {
        let instant = match start {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => resolve_local(tz, d.and_time(chrono::NaiveTime::MIN)),
        };

        instant >= self.time_min && instant <= self.time_max
    }

    pub fn from_rfc3339(&self) -> String {
        self.time_min.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.time_max.to_rfc3339()
    }
}
