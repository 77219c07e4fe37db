//! Scrape source for the municipal meetings calendar page.
//!
//! Fetches the listing over HTTP and follows its "load more" pager link,
//! at most `max_load_more` times with `settle_delay` between requests.

mod html;
mod page;

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use civicsync_core::config::SyncConfig;
use civicsync_core::error::{SyncError, SyncResult};
use civicsync_core::event::RawMeeting;
use civicsync_core::store::MeetingSource;
use log::{debug, info, warn};
use url::Url;

use page::parse_page;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CalendarPage {
    client: reqwest::Client,
    url: Url,
    max_load_more: u32,
    settle_delay: Duration,
}

impl CalendarPage {
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let url = Url::parse(&config.source_url).map_err(|e| {
            SyncError::Config(format!("Invalid source_url '{}': {e}", config.source_url))
        })?;

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("civicsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Http(e.to_string()))?;

        Ok(CalendarPage {
            client,
            url,
            max_load_more: config.max_load_more,
            settle_delay: config.settle_delay,
        })
    }

    async fn get(&self, url: &Url) -> SyncResult<String> {
        debug!("GET {url}");
        self.client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SyncError::Http(format!("Failed to fetch {url}: {e}")))?
            .text()
            .await
            .map_err(|e| SyncError::Http(format!("Failed to read {url}: {e}")))
    }
}

impl MeetingSource for CalendarPage {
    async fn fetch(&self) -> SyncResult<Vec<RawMeeting>> {
        let scraped_at = Utc::now();
        let mut url = self.url.clone();
        let mut visited = HashSet::from([url.clone()]);
        let mut meetings = Vec::new();
        let mut date = None;
        let mut loads = 0;

        loop {
            let html = match self.get(&url).await {
                Ok(html) => html,
                Err(e) if loads > 0 => {
                    warn!("Stopped loading more meetings: {e}");
                    break;
                }
                Err(e) => return Err(e),
            };

            let Some(page) = parse_page(&html, &url, date.take(), scraped_at) else {
                if loads == 0 {
                    return Err(SyncError::SourceUnavailable(format!(
                        "no meeting listing found on {url}; the page layout may have changed"
                    )));
                }
                warn!("No meeting listing on {url}; stopping");
                break;
            };

            debug!("{} meetings on {url}", page.meetings.len());
            meetings.extend(page.meetings);
            date = page.last_date;

            let Some(next) = page.next else {
                break;
            };
            if loads >= self.max_load_more {
                info!("Reached the limit of {} extra pages", self.max_load_more);
                break;
            }
            if !visited.insert(next.clone()) {
                warn!("Pager loops back to {next}; stopping");
                break;
            }

            loads += 1;
            info!("Loading page {}...", loads);
            tokio::time::sleep(self.settle_delay).await;
            url = next;
        }

        info!("Scraped {} meetings", meetings.len());
        Ok(meetings)
    }
}
