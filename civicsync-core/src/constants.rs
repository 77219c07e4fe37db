//! Policy defaults used when no configuration overrides them.

/// Civil timezone the municipal calendar is published in.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Meetings don't publish an end time, so assume this long.
pub const DEFAULT_DURATION_HOURS: i64 = 2;

/// Start-of-day used when a meeting has no parseable time.
pub const DEFAULT_START_HOUR: u32 = 9;

/// Days added on each side of the scraped range when loading remote events.
pub const WINDOW_PADDING_DAYS: i64 = 30;

/// Hard cap on "load more" pager iterations while scraping.
pub const MAX_LOAD_MORE: u32 = 20;

/// Delay between "load more" iterations.
pub const SETTLE_DELAY_SECS: u64 = 2;

pub const DEFAULT_LOCATION: &str = "Portsmouth, NH";

pub const SOURCE_URL: &str = "https://www.portsmouthnh.gov/city-municipal-meetings-calendar";

/// Label attached to events as their origin.
pub const SOURCE_TITLE: &str = "Portsmouth Municipal Calendar";

pub const CALENDAR_SUMMARY: &str = "Portsmouth NH Municipal Meetings";

pub const CALENDAR_DESCRIPTION: &str = "Automated calendar of Portsmouth, NH municipal meetings and events. Scraped from portsmouthnh.gov";

pub const DEFAULT_PROVIDER: &str = "google";
