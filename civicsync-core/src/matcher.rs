//! Finds the remote event that corresponds to a canonical event.

use crate::event::{CanonicalEvent, EventTime, RemoteEvent};

/// Identity of a meeting across sync runs: title plus start.
///
/// Titles must be byte-equal. Starts compare with [`EventTime::same_as`],
/// so a timed start never matches an all-day one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKey<'a> {
    pub title: &'a str,
    pub start: EventTime,
}

impl<'a> MatchKey<'a> {
    pub fn of_canonical(event: &'a CanonicalEvent) -> Self {
        MatchKey {
            title: &event.title,
            start: EventTime::DateTime(event.start),
        }
    }

    pub fn of_remote(event: &'a RemoteEvent) -> Self {
        MatchKey {
            title: &event.title,
            start: event.start.clone(),
        }
    }

    pub fn matches(&self, other: &MatchKey<'_>) -> bool {
        self.title == other.title && self.start.same_as(&other.start)
    }
}

/// First remote event (in list order) sharing the canonical event's key.
///
/// Several remote events with one key aren't expected; when it happens the
/// first one wins and the rest are left unmatched.
pub fn find_match<'r>(
    canonical: &CanonicalEvent,
    remote_events: &'r [RemoteEvent],
) -> Option<&'r RemoteEvent> {
    let key = MatchKey::of_canonical(canonical);
    remote_events
        .iter()
        .find(|remote| key.matches(&MatchKey::of_remote(remote)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SourceKey;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn canonical(title: &str, start: DateTime<Utc>) -> CanonicalEvent {
        CanonicalEvent {
            title: title.to_string(),
            start,
            end: start + Duration::hours(2),
            location: "Portsmouth, NH".to_string(),
            description: "desc".to_string(),
            source: SourceKey {
                source_url: String::new(),
                details_url: None,
                original_date: "June 1, 2025".to_string(),
                scraped_at: start,
            },
        }
    }

    fn remote(id: &str, title: &str, start: EventTime) -> RemoteEvent {
        RemoteEvent {
            id: id.to_string(),
            title: title.to_string(),
            start,
            end: None,
            description: None,
            location: None,
        }
    }

    fn june_first_7pm() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap()
    }

    #[test]
    fn matches_on_title_and_start() {
        let event = canonical("Planning Board", june_first_7pm());
        let remotes = vec![
            remote("a", "City Council", EventTime::DateTime(june_first_7pm())),
            remote("b", "Planning Board", EventTime::DateTime(june_first_7pm())),
        ];

        assert_eq!(find_match(&event, &remotes).map(|r| r.id.as_str()), Some("b"));
    }

    #[test]
    fn same_title_other_day_is_a_different_meeting() {
        let event = canonical("Planning Board", june_first_7pm());
        let remotes = vec![remote(
            "a",
            "Planning Board",
            EventTime::DateTime(june_first_7pm() + Duration::days(14)),
        )];

        assert!(find_match(&event, &remotes).is_none());
    }

    #[test]
    fn title_compare_is_exact() {
        let event = canonical("Planning Board", june_first_7pm());
        let remotes = vec![remote("a", "planning board", EventTime::DateTime(june_first_7pm()))];

        assert!(find_match(&event, &remotes).is_none());
    }

    #[test]
    fn all_day_remote_never_matches_timed_canonical() {
        let midnight = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let event = canonical("Holiday", midnight);
        let remotes = vec![remote(
            "a",
            "Holiday",
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        )];

        assert!(find_match(&event, &remotes).is_none());
    }

    #[test]
    fn duplicate_remote_keys_first_wins() {
        let event = canonical("Planning Board", june_first_7pm());
        let remotes = vec![
            remote("first", "Planning Board", EventTime::DateTime(june_first_7pm())),
            remote("second", "Planning Board", EventTime::DateTime(june_first_7pm())),
        ];

        assert_eq!(find_match(&event, &remotes).map(|r| r.id.as_str()), Some("first"));
    }
}
