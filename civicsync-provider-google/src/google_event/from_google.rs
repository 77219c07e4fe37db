use anyhow::{Result, bail};
use civicsync_core::event::{EventTime, RemoteEvent};
use google_calendar::types::{Event, EventDateTime};

pub trait FromGoogle {
    fn from_google(event: Event) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for RemoteEvent {
    fn from_google(event: Event) -> Result<Self> {
        let Some(start) = event.start.as_ref().and_then(event_time_from_google) else {
            bail!("Event {} has no start time", event.id);
        };
        let end = event.end.as_ref().and_then(event_time_from_google);

        Ok(RemoteEvent {
            id: event.id,
            title: event.summary,
            start,
            end,
            description: non_empty(event.description),
            location: non_empty(event.location),
        })
    }
}

/// Whether Google still lists this event but it has been cancelled.
pub fn is_cancelled(event: &Event) -> bool {
    event.status == "cancelled"
}

fn event_time_from_google(time: &EventDateTime) -> Option<EventTime> {
    if let Some(dt) = time.date_time {
        Some(EventTime::DateTime(dt))
    } else {
        time.date.map(EventTime::Date)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
