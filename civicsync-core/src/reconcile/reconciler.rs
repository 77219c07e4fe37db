use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::detect::changed_fields;
use crate::error::{SyncError, SyncResult};
use crate::event::{CanonicalEvent, RawMeeting, RemoteEvent};
use crate::matcher::find_match;
use crate::normalize::normalize_all;
use crate::reconcile::plan::{Mutation, SyncPlan};
use crate::reconcile::summary::SyncSummary;
use crate::store::EventStore;
use crate::window::SyncWindow;

/// Decides and applies the mutations that make a remote calendar mirror a scrape.
pub struct Reconciler<'a> {
    config: &'a SyncConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a SyncConfig) -> Self {
        Reconciler { config }
    }

    /// Build the mutation plan for one pass. Pure: touches no store.
    ///
    /// Remote events outside `window` are ignored entirely. Canonical events
    /// are processed in scrape order; a canonical event repeating an earlier
    /// one's key is dropped as a duplicate.
    pub fn plan(
        &self,
        canonical: &[CanonicalEvent],
        remote: &[RemoteEvent],
        window: &SyncWindow,
    ) -> SyncPlan {
        let candidates: Vec<RemoteEvent> = remote
            .iter()
            .filter(|r| window.contains(&r.start, &self.config.timezone))
            .cloned()
            .collect();

        let mut seen_remote: HashSet<&str> = HashSet::new();
        let mut seen_keys: HashSet<(&str, DateTime<Utc>)> = HashSet::new();

        let mut creates = Vec::new();
        let mut updates = Vec::new();
        let mut unchanged = 0;
        let mut duplicates = 0;
        let mut total = 0;

        for event in canonical {
            if !seen_keys.insert((event.title.as_str(), event.start)) {
                debug!("Dropping duplicate meeting '{}' at {}", event.title, event.start);
                duplicates += 1;
                continue;
            }
            total += 1;

            match find_match(event, &candidates) {
                Some(matched) => {
                    seen_remote.insert(matched.id.as_str());
                    let changes = changed_fields(event, matched);
                    if changes.is_empty() {
                        unchanged += 1;
                    } else {
                        updates.push(Mutation::Update {
                            remote: matched.clone(),
                            event: event.clone(),
                            changes,
                        });
                    }
                }
                None => creates.push(Mutation::Create {
                    event: event.clone(),
                }),
            }
        }

        let deletes = candidates
            .iter()
            .filter(|r| !seen_remote.contains(r.id.as_str()))
            .map(|r| Mutation::Delete { remote: r.clone() });

        let mut mutations = creates;
        mutations.extend(updates);
        mutations.extend(deletes);

        SyncPlan {
            window: window.clone(),
            mutations,
            unchanged,
            invalid: 0,
            duplicates,
            total,
        }
    }

    /// Normalize a scrape, load the remote events in its window and plan the pass.
    ///
    /// Fails with `SourceUnavailable` when nothing usable was scraped; in that
    /// case the store is never contacted.
    pub async fn prepare<S: EventStore>(
        &self,
        raws: &[RawMeeting],
        store: &S,
    ) -> SyncResult<SyncPlan> {
        let (canonical, rejected) = normalize_all(raws, self.config);

        let window = SyncWindow::around(&canonical, self.config.window_padding).ok_or_else(|| {
            SyncError::SourceUnavailable(format!(
                "no usable meetings ({} scraped, {} rejected)",
                raws.len(),
                rejected.len()
            ))
        })?;

        info!(
            "Loading remote events from {} to {}",
            window.from_rfc3339(),
            window.to_rfc3339()
        );
        let remote = store.list(&window).await?;
        info!("Found {} existing events", remote.len());

        let mut plan = self.plan(&canonical, &remote, &window);
        plan.invalid = rejected.len();
        Ok(plan)
    }

    /// Execute a plan one mutation at a time.
    ///
    /// A failed mutation is logged and counted, and the pass moves on. A fatal
    /// error (lost credentials) stops further calls; the mutations not yet
    /// attempted are counted as failed.
    pub async fn apply<S: EventStore>(&self, plan: &SyncPlan, store: &S) -> SyncSummary {
        let mut summary = SyncSummary::for_plan(plan);
        let mut aborted = false;

        for mutation in &plan.mutations {
            let kind = mutation.kind();

            if aborted {
                summary.record_failure(mutation_error(mutation, "not attempted after fatal error"));
                continue;
            }

            let result = match mutation {
                Mutation::Create { event } => store.create(event).await.map(|_| ()),
                Mutation::Update { remote, event, .. } => {
                    store.update(&remote.id, event).await.map(|_| ())
                }
                Mutation::Delete { remote } => store.delete(&remote.id).await,
            };

            match result {
                Ok(()) => {
                    info!("{} {}", kind.verb(), mutation.title());
                    summary.record_success(kind);
                }
                Err(e) => {
                    error!("Failed to {} '{}': {}", kind.verb(), mutation.title(), e);
                    if e.is_fatal() {
                        warn!("Stopping sync: {e}");
                        aborted = true;
                    }
                    summary.record_failure(mutation_error(mutation, &e.to_string()));
                }
            }
        }

        summary
    }

    /// Full pass: prepare, then apply.
    pub async fn run<S: EventStore>(&self, raws: &[RawMeeting], store: &S) -> SyncResult<SyncSummary> {
        let plan = self.prepare(raws, store).await?;
        Ok(self.apply(&plan, store).await)
    }
}

fn mutation_error(mutation: &Mutation, message: &str) -> SyncError {
    SyncError::Mutation {
        action: mutation.kind().verb().to_string(),
        title: mutation.title().to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, SourceKey};
    use crate::reconcile::plan::MutationKind;
    use crate::store::memory::MemoryStore;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn scraped(title: &str, date: &str, time: &str) -> RawMeeting {
        RawMeeting {
            title: title.to_string(),
            date: date.to_string(),
            time: Some(time.to_string()),
            location: None,
            board: Some("Planning".to_string()),
            details_url: None,
            scraped_at: Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap(),
        }
    }

    fn canonical(title: &str, start: DateTime<Utc>) -> CanonicalEvent {
        CanonicalEvent {
            title: title.to_string(),
            start,
            end: start + Duration::hours(2),
            location: "Portsmouth, NH".to_string(),
            description: format!("{title} description"),
            source: SourceKey {
                source_url: String::new(),
                details_url: None,
                original_date: String::new(),
                scraped_at: start,
            },
        }
    }

    fn june(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn window_for(events: &[CanonicalEvent]) -> SyncWindow {
        SyncWindow::around(events, Duration::days(30)).unwrap()
    }

    fn kinds(plan: &SyncPlan) -> Vec<(MutationKind, String)> {
        plan.mutations
            .iter()
            .map(|m| (m.kind(), m.title().to_string()))
            .collect()
    }

    #[test]
    fn unmatched_canonical_events_are_created() {
        let config = SyncConfig::default();
        let events = vec![canonical("Planning Board", june(1, 23))];

        let plan = Reconciler::new(&config).plan(&events, &[], &window_for(&events));

        assert_eq!(kinds(&plan), vec![(MutationKind::Create, "Planning Board".to_string())]);
        assert_eq!(plan.total, 1);
        assert_eq!(plan.unchanged, 0);
    }

    #[test]
    fn matched_and_equal_is_skipped() {
        let config = SyncConfig::default();
        let events = vec![canonical("Planning Board", june(1, 23))];
        let remote = vec![RemoteEvent::from_canonical("r1", &events[0])];

        let plan = Reconciler::new(&config).plan(&events, &remote, &window_for(&events));

        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn matched_with_drift_is_updated_once() {
        let config = SyncConfig::default();
        let events = vec![canonical("Planning Board", june(1, 23))];
        let mut stale = RemoteEvent::from_canonical("r1", &events[0]);
        stale.location = Some("Old Library".to_string());

        let plan = Reconciler::new(&config).plan(&events, &[stale], &window_for(&events));

        assert_eq!(plan.mutations.len(), 1);
        assert_eq!(plan.mutations[0].kind(), MutationKind::Update);
        assert_eq!(plan.mutations[0].remote_id(), Some("r1"));
    }

    #[test]
    fn orphans_inside_window_are_deleted_outside_are_ignored() {
        let config = SyncConfig::default();
        let events = vec![canonical("Planning Board", june(1, 23))];
        let orphan = RemoteEvent::from_canonical("orphan", &canonical("Cancelled Hearing", june(10, 14)));
        let far_future = RemoteEvent::from_canonical(
            "far",
            &canonical("Budget Session", june(1, 23) + Duration::days(120)),
        );
        let far_all_day = RemoteEvent {
            start: EventTime::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            ..RemoteEvent::from_canonical("old", &canonical("Old", june(1, 23)))
        };

        let plan = Reconciler::new(&config).plan(
            &events,
            &[orphan, far_future, far_all_day],
            &window_for(&events),
        );

        let deleted: Vec<_> = plan.iter_kind(MutationKind::Delete).filter_map(|m| m.remote_id()).collect();
        assert_eq!(deleted, vec!["orphan"]);
    }

    #[test]
    fn plan_orders_creates_then_updates_then_deletes() {
        let config = SyncConfig::default();
        let events = vec![
            canonical("Conservation Commission", june(2, 23)),
            canonical("Planning Board", june(1, 23)),
            canonical("Zoning Board", june(3, 23)),
        ];
        let mut stale = RemoteEvent::from_canonical("pb", &events[1]);
        stale.description = None;
        let orphan = RemoteEvent::from_canonical("gone", &canonical("Old Hearing", june(4, 23)));

        let plan = Reconciler::new(&config).plan(&events, &[orphan, stale], &window_for(&events));

        assert_eq!(
            kinds(&plan),
            vec![
                (MutationKind::Create, "Conservation Commission".to_string()),
                (MutationKind::Create, "Zoning Board".to_string()),
                (MutationKind::Update, "Planning Board".to_string()),
                (MutationKind::Delete, "Old Hearing".to_string()),
            ]
        );
    }

    #[test]
    fn retimed_meeting_creates_new_and_deletes_old_slot() {
        let config = SyncConfig::default();
        let events = vec![canonical("Planning Board", june(1, 22))];
        let old_slot = RemoteEvent::from_canonical("old", &canonical("Planning Board", june(1, 23)));

        let plan = Reconciler::new(&config).plan(&events, &[old_slot], &window_for(&events));

        assert_eq!(
            kinds(&plan),
            vec![
                (MutationKind::Create, "Planning Board".to_string()),
                (MutationKind::Delete, "Planning Board".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_scrape_entries_are_created_once() {
        let config = SyncConfig::default();
        let events = vec![
            canonical("Planning Board", june(1, 23)),
            canonical("Planning Board", june(1, 23)),
        ];

        let plan = Reconciler::new(&config).plan(&events, &[], &window_for(&events));

        assert_eq!(plan.count(MutationKind::Create), 1);
        assert_eq!(plan.duplicates, 1);
        assert_eq!(plan.total, 1);
    }

    #[test]
    fn duplicate_remote_keys_keep_first_and_delete_rest() {
        let config = SyncConfig::default();
        let events = vec![canonical("Planning Board", june(1, 23))];
        let remote = vec![
            RemoteEvent::from_canonical("first", &events[0]),
            RemoteEvent::from_canonical("second", &events[0]),
        ];

        let plan = Reconciler::new(&config).plan(&events, &remote, &window_for(&events));

        assert_eq!(plan.unchanged, 1);
        let deleted: Vec<_> = plan.iter_kind(MutationKind::Delete).filter_map(|m| m.remote_id()).collect();
        assert_eq!(deleted, vec!["second"]);
    }

    #[tokio::test]
    async fn planning_board_scenario_against_empty_store() {
        let config = SyncConfig::default();
        let store = MemoryStore::default();
        let raws = vec![scraped("Planning Board", "June 1, 2025", "7:00 PM")];

        let plan = Reconciler::new(&config).prepare(&raws, &store).await.unwrap();

        assert_eq!(plan.mutations.len(), 1);
        match &plan.mutations[0] {
            Mutation::Create { event } => {
                assert_eq!(event.start, june(1, 23));
                assert_eq!(event.end, Utc.with_ymd_and_hms(2025, 6, 2, 1, 0, 0).unwrap());
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_pass_is_a_no_op() {
        let config = SyncConfig::default();
        let store = MemoryStore::default();
        let reconciler = Reconciler::new(&config);
        let raws = vec![
            scraped("Planning Board", "June 1, 2025", "7:00 PM"),
            scraped("City Council", "June 2, 2025", "7:00 PM"),
            scraped("Planning Board", "June 15, 2025", "7:00 PM"),
        ];

        let first = reconciler.run(&raws, &store).await.unwrap();
        assert_eq!(first.created, 3);

        let second = reconciler.prepare(&raws, &store).await.unwrap();
        assert!(second.is_empty(), "second pass planned {:?}", second.mutations);
        assert_eq!(second.unchanged, 3);
    }

    #[tokio::test]
    async fn location_change_updates_in_place() {
        let config = SyncConfig::default();
        let store = MemoryStore::default();
        let reconciler = Reconciler::new(&config);
        let mut raws = vec![scraped("Planning Board", "June 1, 2025", "7:00 PM")];
        reconciler.run(&raws, &store).await.unwrap();

        raws[0].location = Some("Council Chambers".to_string());
        let summary = reconciler.run(&raws, &store).await.unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.created, 0);
        let events = store.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].location.as_deref(), Some("Council Chambers"));
    }

    #[tokio::test]
    async fn failed_mutation_does_not_stop_the_pass() {
        let config = SyncConfig::default();
        let mut store = MemoryStore::default();
        store.failing.insert("City Council".to_string());
        let raws = vec![
            scraped("City Council", "June 2, 2025", "7:00 PM"),
            scraped("Planning Board", "June 1, 2025", "7:00 PM"),
        ];

        let summary = Reconciler::new(&config).run(&raws, &store).await.unwrap();

        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total, 2);
        assert!(matches!(
            &summary.failures[0],
            SyncError::Mutation { action, title, .. } if action == "create" && title == "City Council"
        ));
    }

    #[tokio::test]
    async fn lost_credentials_stop_the_pass() {
        let config = SyncConfig::default();
        let orphan = RemoteEvent::from_canonical("orphan", &canonical("Cancelled Hearing", june(3, 23)));
        let mut store = MemoryStore::with_events(vec![orphan]);
        store.auth_failing.insert("City Council".to_string());
        let raws = vec![
            scraped("Planning Board", "June 1, 2025", "7:00 PM"),
            scraped("City Council", "June 2, 2025", "7:00 PM"),
            scraped("Zoning Board", "June 4, 2025", "7:00 PM"),
        ];

        let summary = Reconciler::new(&config).run(&raws, &store).await.unwrap();

        assert_eq!(
            *store.calls.borrow(),
            vec![
                "list".to_string(),
                "create Planning Board".to_string(),
                "create City Council".to_string(),
            ]
        );
        assert_eq!(summary.created, 1);
        assert_eq!(summary.deleted, 0);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.total, 3);
        assert!(matches!(
            &summary.failures[1],
            SyncError::Mutation { action, title, message }
                if action == "create" && title == "Zoning Board" && message.contains("not attempted")
        ));
        assert!(matches!(
            &summary.failures[2],
            SyncError::Mutation { action, title, .. } if action == "delete" && title == "Cancelled Hearing"
        ));
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn empty_scrape_never_touches_the_store() {
        let config = SyncConfig::default();
        let store = MemoryStore::default();

        let err = Reconciler::new(&config).run(&[], &store).await.unwrap_err();

        assert!(matches!(err, SyncError::SourceUnavailable(_)));
        assert!(store.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn invalid_dates_are_counted_not_synced() {
        let config = SyncConfig::default();
        let store = MemoryStore::default();
        let raws = vec![
            scraped("Planning Board", "June 1, 2025", "7:00 PM"),
            scraped("Mystery Meeting", "TBA", "7:00 PM"),
        ];

        let summary = Reconciler::new(&config).run(&raws, &store).await.unwrap();

        assert_eq!(summary.created, 1);
        assert_eq!(summary.invalid, 1);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn orphan_is_deleted_from_store() {
        let config = SyncConfig::default();
        let orphan = RemoteEvent::from_canonical("orphan", &canonical("Cancelled Hearing", june(3, 23)));
        let store = MemoryStore::with_events(vec![orphan]);
        let raws = vec![scraped("Planning Board", "June 1, 2025", "7:00 PM")];

        let summary = Reconciler::new(&config).run(&raws, &store).await.unwrap();

        assert_eq!((summary.created, summary.deleted), (1, 1));
        let titles: Vec<_> = store.snapshot().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Planning Board".to_string()]);
    }
}
