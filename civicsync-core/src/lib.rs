//! Core of civicsync: turns scraped municipal meetings into calendar events
//! and reconciles them against a remote calendar.
//!
//! - `normalize` converts scraped meetings into canonical events
//! - `matcher` and `detect` pair canonical events with remote ones and diff them
//! - `reconcile` plans and applies creates, updates and deletes
//! - `remote` talks to provider binaries over the JSON protocol

pub mod config;
pub mod constants;
pub mod detect;
pub mod error;
pub mod event;
pub mod matcher;
pub mod normalize;
pub mod reconcile;
pub mod remote;
pub mod store;
pub mod window;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use event::{CanonicalEvent, EventTime, RawMeeting, RemoteEvent, SourceKey};
pub use reconcile::{Mutation, MutationKind, Reconciler, SyncPlan, SyncSummary};
pub use store::{EventStore, JsonFileSource, MeetingSource};
pub use window::SyncWindow;
