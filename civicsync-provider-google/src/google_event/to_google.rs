use civicsync_core::constants::{SOURCE_TITLE, SOURCE_URL};
use civicsync_core::event::{CanonicalEvent, SourceKey};
use google_calendar::types::{Event, EventDateTime, Source};

pub trait ToGoogle {
    /// Google event for this value, with times labelled in `time_zone`.
    fn to_google(&self, time_zone: &str) -> Event;
}

impl ToGoogle for CanonicalEvent {
    fn to_google(&self, time_zone: &str) -> Event {
        Event {
            summary: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start: Some(instant_to_google(self.start, time_zone)),
            end: Some(instant_to_google(self.end, time_zone)),
            source: Some(source_link(&self.source)),
            ..Default::default()
        }
    }
}

/// Google's `source` link: the meeting's own page, else the listing it came from.
// google-calendar 0.10 models extendedProperties.private as an empty struct,
// so the rest of SourceKey cannot be stored on the event.
fn source_link(source: &SourceKey) -> Source {
    let url = source
        .details_url
        .clone()
        .filter(|url| !url.is_empty())
        .or_else(|| Some(source.source_url.clone()).filter(|url| !url.is_empty()))
        .unwrap_or_else(|| SOURCE_URL.to_string());

    Source {
        title: SOURCE_TITLE.to_string(),
        url,
    }
}

fn instant_to_google(instant: chrono::DateTime<chrono::Utc>, time_zone: &str) -> EventDateTime {
    EventDateTime {
        date: None,
        date_time: Some(instant),
        time_zone: time_zone.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn planning_board(details_url: Option<&str>, source_url: &str) -> CanonicalEvent {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
        CanonicalEvent {
            title: "Planning Board".to_string(),
            start,
            end: start + chrono::Duration::hours(2),
            location: "City Hall".to_string(),
            description: "Board: PB".to_string(),
            source: SourceKey {
                source_url: source_url.to_string(),
                details_url: details_url.map(str::to_string),
                original_date: "June 1, 2025".to_string(),
                scraped_at: start,
            },
        }
    }

    #[test]
    fn canonical_event_becomes_timed_google_event() {
        let event = planning_board(None, SOURCE_URL);
        let start = event.start;

        let google = event.to_google("America/New_York");

        assert_eq!(google.id, "");
        assert_eq!(google.summary, "Planning Board");
        assert_eq!(google.location, "City Hall");
        let google_start = google.start.unwrap();
        assert_eq!(google_start.date_time, Some(start));
        assert_eq!(google_start.date, None);
        assert_eq!(google_start.time_zone, "America/New_York");
        assert_eq!(
            google.end.unwrap().date_time,
            Some(start + chrono::Duration::hours(2))
        );
    }

    #[test]
    fn source_links_to_details_page_when_known() {
        let event = planning_board(
            Some("https://www.portsmouthnh.gov/planning/pb-0601"),
            SOURCE_URL,
        );

        let source = event.to_google("America/New_York").source.unwrap();

        assert_eq!(source.title, "Portsmouth Municipal Calendar");
        assert_eq!(source.url, "https://www.portsmouthnh.gov/planning/pb-0601");
    }

    #[test]
    fn source_falls_back_to_listing_page() {
        let listing = "https://example.org/meetings";
        let source = planning_board(None, listing)
            .to_google("America/New_York")
            .source
            .unwrap();
        assert_eq!(source.url, listing);

        let source = planning_board(Some(""), "")
            .to_google("America/New_York")
            .source
            .unwrap();
        assert_eq!(source.url, SOURCE_URL);
    }
}
