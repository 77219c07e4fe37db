//! civicsync configuration.
//!
//! Values are layered: built-in defaults, then `~/.config/civicsync/config.toml`,
//! then `CIVICSYNC_*` environment variables. The resolved `SyncConfig` is
//! passed explicitly into the normalizer and reconciler.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DURATION_HOURS, DEFAULT_LOCATION, DEFAULT_PROVIDER, DEFAULT_START_HOUR,
    DEFAULT_TIMEZONE, MAX_LOAD_MORE, SETTLE_DELAY_SECS, SOURCE_URL, WINDOW_PADDING_DAYS,
};
use crate::error::{SyncError, SyncResult};

const ENV_PREFIX: &str = "CIVICSYNC";

/// Older `.env` files set this directly; honoured when no configured id exists.
const LEGACY_CALENDAR_ID_VAR: &str = "GOOGLE_CALENDAR_ID";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_duration() -> String {
    format!("{DEFAULT_DURATION_HOURS}h")
}

fn default_start() -> String {
    format!("{DEFAULT_START_HOUR:02}:00")
}

fn default_padding_days() -> i64 {
    WINDOW_PADDING_DAYS
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_source_url() -> String {
    SOURCE_URL.to_string()
}

fn default_max_load_more() -> u32 {
    MAX_LOAD_MORE
}

fn default_settle_delay() -> String {
    format!("{SETTLE_DELAY_SECS}s")
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

/// On-disk / environment shape of the configuration (all strings, as written by users).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default = "default_duration")]
    default_duration: String,
    #[serde(default = "default_start")]
    default_start: String,
    #[serde(default = "default_padding_days")]
    window_padding_days: i64,
    #[serde(default = "default_location")]
    location_placeholder: String,
    #[serde(default = "default_source_url")]
    source_url: String,
    #[serde(default = "default_max_load_more")]
    max_load_more: u32,
    #[serde(default = "default_settle_delay")]
    settle_delay: String,
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    calendar_id: Option<String>,
}

/// Resolved configuration for one sync pass.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Civil timezone scraped dates and times are interpreted in
    pub timezone: Tz,
    /// Length assigned to every meeting
    pub default_duration: Duration,
    /// Start time used when a meeting has no parseable time
    pub default_start: NaiveTime,
    /// Padding on each side of the scraped range
    pub window_padding: Duration,
    /// Location used when the scrape has none
    pub location_placeholder: String,
    /// Calendar page to scrape
    pub source_url: String,
    /// Cap on "load more" pager iterations
    pub max_load_more: u32,
    /// Pause between pager iterations
    pub settle_delay: std::time::Duration,
    /// Provider binary suffix (`civicsync-provider-<provider>`)
    pub provider: String,
    /// Provider account (e.g. Google account email)
    pub account: Option<String>,
    /// Target calendar; created on first sync when absent
    pub calendar_id: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            timezone: chrono_tz::America::New_York,
            default_duration: Duration::hours(DEFAULT_DURATION_HOURS),
            default_start: NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            window_padding: Duration::days(WINDOW_PADDING_DAYS),
            location_placeholder: DEFAULT_LOCATION.to_string(),
            source_url: SOURCE_URL.to_string(),
            max_load_more: MAX_LOAD_MORE,
            settle_delay: std::time::Duration::from_secs(SETTLE_DELAY_SECS),
            provider: DEFAULT_PROVIDER.to_string(),
            account: None,
            calendar_id: None,
        }
    }
}

impl SyncConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("civicsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path plus environment overrides.
    pub fn load() -> SyncResult<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load from `path` (which may not exist) plus environment overrides.
    pub fn load_from(path: &Path) -> SyncResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        let mut file: ConfigFile = settings
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        if file.calendar_id.is_none() {
            file.calendar_id = std::env::var(LEGACY_CALENDAR_ID_VAR)
                .ok()
                .filter(|id| !id.trim().is_empty());
        }

        Self::try_from(file)
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = format!(
            "\
# civicsync configuration

# Timezone the meeting calendar is published in:
# timezone = \"{DEFAULT_TIMEZONE}\"

# Length of every meeting, and start time when none is listed:
# default_duration = \"{}\"
# default_start = \"{}\"

# Days of padding around the scraped range when looking for stale events:
# window_padding_days = {WINDOW_PADDING_DAYS}

# location_placeholder = \"{DEFAULT_LOCATION}\"
# source_url = \"{SOURCE_URL}\"

# Scraper pagination limits:
# max_load_more = {MAX_LOAD_MORE}
# settle_delay = \"{}\"

# Where events are synced to:
# provider = \"{DEFAULT_PROVIDER}\"
# account = \"you@example.com\"
# calendar_id = \"...@group.calendar.google.com\"
",
            default_duration(),
            default_start(),
            default_settle_delay(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

impl TryFrom<ConfigFile> for SyncConfig {
    type Error = SyncError;

    fn try_from(file: ConfigFile) -> SyncResult<Self> {
        let timezone: Tz = file
            .timezone
            .parse()
            .map_err(|_| SyncError::Config(format!("Unknown timezone '{}'", file.timezone)))?;

        let default_duration = parse_duration("default_duration", &file.default_duration)?;
        let default_duration = Duration::from_std(default_duration)
            .map_err(|_| SyncError::Config("default_duration is too large".into()))?;

        let default_start = NaiveTime::parse_from_str(&file.default_start, "%H:%M").map_err(|_| {
            SyncError::Config(format!(
                "Invalid default_start '{}'. Expected HH:MM",
                file.default_start
            ))
        })?;

        if file.window_padding_days < 0 {
            return Err(SyncError::Config(
                "window_padding_days must not be negative".into(),
            ));
        }

        let settle_delay = parse_duration("settle_delay", &file.settle_delay)?;

        Ok(SyncConfig {
            timezone,
            default_duration,
            default_start,
            window_padding: Duration::days(file.window_padding_days),
            location_placeholder: file.location_placeholder,
            source_url: file.source_url,
            max_load_more: file.max_load_more,
            settle_delay,
            provider: file.provider,
            account: file.account,
            calendar_id: file.calendar_id,
        })
    }
}

fn parse_duration(field: &str, value: &str) -> SyncResult<std::time::Duration> {
    humantime::parse_duration(value)
        .map_err(|e| SyncError::Config(format!("Invalid {field} '{value}': {e}")))
}
