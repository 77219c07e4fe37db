//! Turns scraped meetings into canonical events.
//!
//! Dates and times on the municipal calendar are free text in local wall
//! clock time. They are resolved in the configured timezone (not the
//! machine's), so the same listing always maps to the same instant.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;
use regex::Regex;
use thiserror::Error;

use crate::config::SyncConfig;
use crate::event::{CanonicalEvent, RawMeeting, SourceKey};

const DESCRIPTION_HEADER: &str = "Portsmouth Municipal Meeting";

/// Formats tried in order after weekday and ordinal suffixes are stripped.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)").expect("valid time regex"));

static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("valid weekday regex")
});

static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal regex"));

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("meeting has no title")]
    EmptyTitle,

    #[error("could not parse date '{date}' for '{title}'")]
    UnparseableDate { title: String, date: String },
}

/// Normalize one scraped meeting.
///
/// A missing or unparseable time falls back to `config.default_start`.
/// An unparseable date is an error: guessing a date would sync the meeting
/// onto the wrong day.
pub fn normalize(raw: &RawMeeting, config: &SyncConfig) -> Result<CanonicalEvent, NormalizeError> {
    let title = raw.title.trim();
    if title.is_empty() {
        return Err(NormalizeError::EmptyTitle);
    }

    let date = parse_date(&raw.date).ok_or_else(|| NormalizeError::UnparseableDate {
        title: title.to_string(),
        date: raw.date.clone(),
    })?;

    let time = raw
        .time
        .as_deref()
        .and_then(parse_time)
        .unwrap_or(config.default_start);

    let start = resolve_local(&config.timezone, date.and_time(time));
    let end = start + config.default_duration;

    Ok(CanonicalEvent {
        title: title.to_string(),
        start,
        end,
        location: non_empty(raw.location.as_deref())
            .unwrap_or(&config.location_placeholder)
            .to_string(),
        description: compose_description(raw, &config.source_url),
        source: SourceKey {
            source_url: config.source_url.clone(),
            details_url: non_empty(raw.details_url.as_deref()).map(str::to_string),
            original_date: raw.date.clone(),
            scraped_at: raw.scraped_at,
        },
    })
}

/// Normalize a whole scrape, dropping (and logging) meetings that can't be normalized.
pub fn normalize_all(
    raws: &[RawMeeting],
    config: &SyncConfig,
) -> (Vec<CanonicalEvent>, Vec<NormalizeError>) {
    let mut events = Vec::with_capacity(raws.len());
    let mut rejected = Vec::new();

    for raw in raws {
        match normalize(raw, config) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("Skipping meeting: {e}");
                rejected.push(e);
            }
        }
    }

    (events, rejected)
}

/// Parse a human-readable date such as "Wednesday, January 15th, 2026".
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_weekday = WEEKDAY_RE.replace(&collapsed, "");
    let cleaned = ORDINAL_RE.replace_all(&without_weekday, "$1");

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

/// Parse the first 12-hour clock time (`H:MM AM|PM`) found in `input`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(input)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;

    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match (caps[3].to_ascii_uppercase().as_str(), hour) {
        ("AM", 12) => 0,
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        (_, h) => h,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Interpret a wall-clock time in `tz`.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times
/// inside a spring-forward gap don't exist and are moved one hour later.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()),
    }
}

fn compose_description(raw: &RawMeeting, source_url: &str) -> String {
    let mut description = format!("{DESCRIPTION_HEADER}\n\n");

    if let Some(board) = non_empty(raw.board.as_deref()) {
        description.push_str(&format!("Board/Committee: {board}\n"));
    }
    if let Some(url) = non_empty(raw.details_url.as_deref()) {
        description.push_str(&format!("\nMore information: {url}"));
    }
    description.push_str(&format!("\n\nAutomatically scraped from: {source_url}"));

    description.trim().to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn raw(title: &str, date: &str, time: Option<&str>) -> RawMeeting {
        RawMeeting {
            title: title.to_string(),
            date: date.to_string(),
            time: time.map(str::to_string),
            location: None,
            board: None,
            details_url: None,
            scraped_at: Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap(),
        }
    }

    fn wall_clock(instant: DateTime<Utc>) -> (u32, u32) {
        let local = instant.with_timezone(&chrono_tz::America::New_York);
        (local.hour(), local.minute())
    }

    #[test]
    fn summer_evening_meeting_resolves_in_eastern_daylight_time() {
        let mut meeting = raw("Planning Board", "June 1, 2025", Some("7:00 PM"));
        meeting.board = Some("Planning".to_string());

        let event = normalize(&meeting, &SyncConfig::default()).unwrap();

        assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2025, 6, 2, 1, 0, 0).unwrap());
    }

    #[test]
    fn wall_clock_survives_dst_transition_day() {
        let config = SyncConfig::default();
        let march = normalize(&raw("Council", "March 9, 2025", Some("2:00 PM")), &config).unwrap();
        let july = normalize(&raw("Council", "July 9, 2025", Some("2:00 PM")), &config).unwrap();
        let january = normalize(&raw("Council", "January 9, 2025", Some("2:00 PM")), &config).unwrap();

        assert_eq!(wall_clock(march.start), (14, 0));
        assert_eq!(wall_clock(july.start), (14, 0));
        assert_eq!(wall_clock(january.start), (14, 0));
        assert_eq!(january.start, Utc.with_ymd_and_hms(2025, 1, 9, 19, 0, 0).unwrap());
        assert_eq!(july.start, Utc.with_ymd_and_hms(2025, 7, 9, 18, 0, 0).unwrap());
    }

    #[test]
    fn identical_inputs_give_identical_instants() {
        let config = SyncConfig::default();
        let a = normalize(&raw("Council", "June 1, 2025", Some("7:00 PM")), &config).unwrap();
        let b = normalize(&raw("Council", " June  1, 2025 ", Some("7:00 pm")), &config).unwrap();
        assert_eq!(a.start, b.start);
        assert_eq!(a.end, b.end);
    }

    #[test]
    fn missing_time_defaults_to_nine_am_local() {
        let event = normalize(&raw("Library Trustees", "June 1, 2025", None), &SyncConfig::default())
            .unwrap();
        assert_eq!(wall_clock(event.start), (9, 0));
    }

    #[test]
    fn unparseable_time_defaults_to_nine_am_local() {
        let event = normalize(&raw("Council", "June 1, 2025", Some("TBD")), &SyncConfig::default())
            .unwrap();
        assert_eq!(wall_clock(event.start), (9, 0));
    }

    #[test]
    fn noon_and_midnight_boundaries() {
        assert_eq!(parse_time("12:00 PM"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(parse_time("12:15 am"), NaiveTime::from_hms_opt(0, 15, 0));
        assert_eq!(parse_time("1:05PM"), NaiveTime::from_hms_opt(13, 5, 0));
        assert_eq!(parse_time("11:59 AM"), NaiveTime::from_hms_opt(11, 59, 0));
    }

    #[test]
    fn time_range_takes_first_time() {
        assert_eq!(parse_time("6:00 PM - 8:00 PM"), NaiveTime::from_hms_opt(18, 0, 0));
    }

    #[test]
    fn out_of_range_clock_values_are_rejected() {
        assert_eq!(parse_time("13:00 PM"), None);
        assert_eq!(parse_time("0:30 AM"), None);
        assert_eq!(parse_time("7:75 PM"), None);
        assert_eq!(parse_time("19:00"), None);
    }

    #[test]
    fn date_formats_seen_on_the_calendar() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15);
        assert_eq!(parse_date("January 15, 2026"), expected);
        assert_eq!(parse_date("Jan 15, 2026"), expected);
        assert_eq!(parse_date("Thursday, January 15, 2026"), expected);
        assert_eq!(parse_date("Thu, Jan 15th, 2026"), expected);
        assert_eq!(parse_date("2026-01-15"), expected);
        assert_eq!(parse_date("01/15/2026"), expected);
    }

    #[test]
    fn garbage_date_is_rejected() {
        let err = normalize(&raw("Council", "sometime soon", None), &SyncConfig::default())
            .unwrap_err();
        assert!(matches!(err, NormalizeError::UnparseableDate { .. }));
        assert_eq!(parse_date("February 30, 2025"), None);
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = normalize(&raw("   ", "June 1, 2025", None), &SyncConfig::default()).unwrap_err();
        assert_eq!(err, NormalizeError::EmptyTitle);
    }

    #[test]
    fn spring_forward_gap_moves_one_hour_later() {
        let naive = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = resolve_local(&chrono_tz::America::New_York, naive);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2025, 3, 9, 7, 30, 0).unwrap());
    }

    #[test]
    fn fall_back_ambiguity_takes_earlier_instant() {
        let naive = NaiveDate::from_ymd_opt(2025, 11, 2)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        let resolved = resolve_local(&chrono_tz::America::New_York, naive);
        assert_eq!(resolved, Utc.with_ymd_and_hms(2025, 11, 2, 5, 30, 0).unwrap());
    }

    #[test]
    fn location_defaults_to_placeholder() {
        let mut meeting = raw("Council", "June 1, 2025", None);
        meeting.location = Some("  ".to_string());
        let event = normalize(&meeting, &SyncConfig::default()).unwrap();
        assert_eq!(event.location, "Portsmouth, NH");

        meeting.location = Some("City Hall, Chambers".to_string());
        let event = normalize(&meeting, &SyncConfig::default()).unwrap();
        assert_eq!(event.location, "City Hall, Chambers");
    }

    #[test]
    fn description_embeds_board_and_details_link() {
        let mut meeting = raw("Planning Board", "June 1, 2025", Some("7:00 PM"));
        meeting.board = Some("PB".to_string());
        meeting.details_url = Some("https://www.portsmouthnh.gov/planning/pb-0601".to_string());

        let event = normalize(&meeting, &SyncConfig::default()).unwrap();

        assert_eq!(
            event.description,
            "Portsmouth Municipal Meeting\n\n\
             Board/Committee: PB\n\n\
             More information: https://www.portsmouthnh.gov/planning/pb-0601\n\n\
             Automatically scraped from: https://www.portsmouthnh.gov/city-municipal-meetings-calendar"
        );
        assert_eq!(
            event.source.details_url.as_deref(),
            Some("https://www.portsmouthnh.gov/planning/pb-0601")
        );
        assert_eq!(event.source.original_date, "June 1, 2025");
        assert_eq!(
            event.source.source_url,
            "https://www.portsmouthnh.gov/city-municipal-meetings-calendar"
        );
    }

    #[test]
    fn description_without_optional_fields() {
        let event = normalize(&raw("Council", "June 1, 2025", None), &SyncConfig::default()).unwrap();
        assert_eq!(
            event.description,
            "Portsmouth Municipal Meeting\n\n\n\nAutomatically scraped from: https://www.portsmouthnh.gov/city-municipal-meetings-calendar"
        );
    }

    #[test]
    fn normalize_all_keeps_order_and_reports_rejects() {
        let raws = vec![
            raw("A", "June 1, 2025", None),
            raw("B", "not a date", None),
            raw("C", "June 3, 2025", None),
        ];
        let (events, rejected) = normalize_all(&raws, &SyncConfig::default());
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(rejected.len(), 1);
    }
}
