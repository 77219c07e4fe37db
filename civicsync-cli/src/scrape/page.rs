//! Extraction of meetings from one page of the municipal calendar listing.
//!
//! The listing is a `.rows` container whose direct children alternate
//! between `<h2>` date headers and `<article class="event">` entries. Each
//! article belongs to the most recent header before it.

use chrono::{DateTime, Utc};
use civicsync_core::event::RawMeeting;
use url::Url;

use crate::scrape::html::{self, Element};

/// What one page of the listing yields.
#[derive(Debug, Default)]
pub struct Page {
    pub meetings: Vec<RawMeeting>,
    /// The "load more" target, resolved against the page URL
    pub next: Option<Url>,
    /// Date header in effect at the end of the page
    pub last_date: Option<String>,
}

/// Parse one listing page. Returns `None` when the page has no listing at all.
///
/// `carried_date` is the header in effect at the end of the previous page,
/// for articles that precede the first header on this one.
pub fn parse_page(
    html: &str,
    base: &Url,
    carried_date: Option<String>,
    scraped_at: DateTime<Utc>,
) -> Option<Page> {
    let rows = html::find_by_class(html, "rows")?;

    let mut meetings = Vec::new();
    let mut current_date = carried_date;

    for child in html::children(rows.inner) {
        match child.name.as_str() {
            "h2" => {
                let date = child.text();
                if !date.is_empty() {
                    current_date = Some(date);
                }
            }
            "article" if child.has_class("event") => {
                let Some(date) = &current_date else {
                    log::debug!("Skipping event before any date header");
                    continue;
                };
                if let Some(meeting) = parse_event(&child, date, base, scraped_at) {
                    meetings.push(meeting);
                }
            }
            _ => {}
        }
    }

    Some(Page {
        meetings,
        next: next_link(html, base),
        last_date: current_date,
    })
}

fn parse_event(
    article: &Element<'_>,
    date: &str,
    base: &Url,
    scraped_at: DateTime<Utc>,
) -> Option<RawMeeting> {
    let heading = html::find(article.inner, |name, _| name.eq_ignore_ascii_case("h3"))?;
    let link = html::find(heading.inner, |name, _| name.eq_ignore_ascii_case("a"))?;

    let title = link.text();
    if title.is_empty() {
        log::debug!("Skipping event without a title");
        return None;
    }

    let details_url = link
        .attr("href")
        .and_then(|href| base.join(&href).ok())
        .map(|url| url.to_string());

    Some(RawMeeting {
        title,
        date: date.to_string(),
        time: class_text(article, "time"),
        location: class_text(article, "field--name-field-location"),
        board: class_text(article, "abbrev-badge"),
        details_url,
        scraped_at,
    })
}

/// Text of the first descendant carrying `class`, if non-empty.
fn class_text(parent: &Element<'_>, class: &str) -> Option<String> {
    html::find_by_class(parent.inner, class)
        .map(|el| el.text())
        .filter(|text| !text.is_empty())
}

/// `.pager a[rel="next"]`
fn next_link(html: &str, base: &Url) -> Option<Url> {
    let pager = html::find_by_class(html, "pager")?;
    let link = html::find(pager.inner, |name, attrs| {
        name.eq_ignore_ascii_case("a")
            && html::attr(attrs, "rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("next")))
    })?;

    base.join(&link.attr("href")?).ok()
}
