//! TUI rendering traits for civicsync types.
//!
//! Extension traits that add colored terminal rendering to civicsync-core
//! types using owo_colors.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use civicsync_core::detect::FieldChange;
use civicsync_core::event::EventTime;
use civicsync_core::reconcile::{Mutation, MutationKind, SyncPlan, SyncSummary};
use owo_colors::OwoColorize;

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 10;

/// Longest field value shown in a diff line
const MAX_VALUE_CHARS: usize = 60;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for MutationKind {
    fn render(&self) -> String {
        colorize(*self, self.symbol())
    }
}

impl Render for SyncSummary {
    fn render(&self) -> String {
        let mut parts = vec![
            format!("{} created", self.created).green().to_string(),
            format!("{} updated", self.updated).yellow().to_string(),
            format!("{} deleted", self.deleted).red().to_string(),
            format!("{} unchanged", self.unchanged).dimmed().to_string(),
        ];
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed).red().bold().to_string());
        }
        if self.invalid > 0 {
            parts.push(format!("{} invalid", self.invalid).yellow().to_string());
        }
        if self.duplicates > 0 {
            parts.push(format!("{} duplicate", self.duplicates).dimmed().to_string());
        }

        format!("{} ({} meetings)", parts.join(", "), self.total)
    }
}

/// Colorize text according to the mutation kind
fn colorize(kind: MutationKind, text: &str) -> String {
    match kind {
        MutationKind::Create => text.green().to_string(),
        MutationKind::Update => text.yellow().to_string(),
        MutationKind::Delete => text.red().to_string(),
    }
}

/// Extended rendering for mutations, with times shown in the calendar's timezone
pub trait MutationRender {
    fn render_in(&self, tz: &Tz) -> String;
}

impl MutationRender for Mutation {
    fn render_in(&self, tz: &Tz) -> String {
        let kind = self.kind();
        let when = match self {
            Mutation::Create { event } | Mutation::Update { event, .. } => local_time(event.start, tz),
            Mutation::Delete { remote } => match &remote.start {
                EventTime::DateTime(dt) => local_time(*dt, tz),
                EventTime::Date(d) => d.format("%a %b %-d, %Y").to_string(),
            },
        };

        format!(
            "{} {} {}",
            kind.render(),
            colorize(kind, self.title()),
            when.dimmed()
        )
    }
}

fn local_time(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant
        .with_timezone(tz)
        .format("%a %b %-d, %Y %-I:%M %p")
        .to_string()
}

pub trait PlanRender {
    fn render(&self, tz: &Tz, verbose: bool) -> String;
}

impl PlanRender for SyncPlan {
    fn render(&self, tz: &Tz, verbose: bool) -> String {
        if self.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let mut lines = Vec::new();

        if verbose || self.mutations.len() <= COMPACT_THRESHOLD {
            for mutation in &self.mutations {
                lines.push(format!("   {}", mutation.render_in(tz)));
                if let Mutation::Update { changes, .. } = mutation {
                    lines.extend(changes.iter().map(|c| format!("      {}", render_change(c))));
                }
            }
        } else {
            for (kind, label) in [
                (MutationKind::Create, "new"),
                (MutationKind::Update, "changed"),
                (MutationKind::Delete, "deleted"),
            ] {
                let count = self.count(kind);
                if count > 0 {
                    let text = format!("({} {} {})", count, label, pluralize("event", count));
                    lines.push(format!("   {} {}", kind.render(), colorize(kind, &text)));
                }
            }
        }

        lines.join("\n")
    }
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn render_change(change: &FieldChange) -> String {
    let old = change.old.as_deref().map(shorten).unwrap_or_else(|| "(none)".into());
    let new = shorten(&change.new);
    format!(
        "{}: {} → {}",
        change.field.to_string().dimmed(),
        old.red(),
        new.green()
    )
}

/// Single-line, length-capped rendering of a field value.
fn shorten(value: &str) -> String {
    let flat = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_VALUE_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(MAX_VALUE_CHARS - 1).collect();
        format!("{cut}…")
    }
}

/// Google Calendar web link for `calendar_id`.
pub fn view_calendar_url(calendar_id: &str) -> String {
    format!(
        "https://calendar.google.com/calendar/r?cid={}",
        encode_component(calendar_id)
    )
}

/// Settings page where a calendar can be made public.
pub fn calendar_settings_url(calendar_id: &str) -> String {
    format!(
        "https://calendar.google.com/calendar/r/settings/calendar/{}",
        encode_component(calendar_id)
    )
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_flattens_and_caps() {
        assert_eq!(shorten("Portsmouth Municipal Meeting\n\nBoard/Committee: PB"),
            "Portsmouth Municipal Meeting Board/Committee: PB");

        let long = "x".repeat(100);
        let short = shorten(&long);
        assert_eq!(short.chars().count(), MAX_VALUE_CHARS);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn local_time_uses_calendar_timezone() {
        let instant = DateTime::parse_from_rfc3339("2025-06-01T23:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            local_time(instant, &chrono_tz::America::New_York),
            "Sun Jun 1, 2025 7:00 PM"
        );
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("event", 3), "events");
    }

    #[test]
    fn calendar_links_escape_the_id() {
        let id = "abc123@group.calendar.google.com";
        assert_eq!(
            view_calendar_url(id),
            "https://calendar.google.com/calendar/r?cid=abc123%40group.calendar.google.com"
        );
        assert_eq!(
            calendar_settings_url(id),
            "https://calendar.google.com/calendar/r/settings/calendar/abc123%40group.calendar.google.com"
        );
    }
}
