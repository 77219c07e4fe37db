use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detect::FieldChange;
use crate::event::{CanonicalEvent, RemoteEvent};
use crate::window::SyncWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            MutationKind::Create => "+",
            MutationKind::Update => "~",
            MutationKind::Delete => "-",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One change to apply to the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    Create {
        event: CanonicalEvent,
    },
    Update {
        remote: RemoteEvent,
        event: CanonicalEvent,
        changes: Vec<FieldChange>,
    },
    Delete {
        remote: RemoteEvent,
    },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create { .. } => MutationKind::Create,
            Mutation::Update { .. } => MutationKind::Update,
            Mutation::Delete { .. } => MutationKind::Delete,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Mutation::Create { event } | Mutation::Update { event, .. } => &event.title,
            Mutation::Delete { remote } => &remote.title,
        }
    }

    /// Remote id this mutation targets (none for creates).
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Mutation::Create { .. } => None,
            Mutation::Update { remote, .. } | Mutation::Delete { remote } => Some(&remote.id),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.title())
    }
}

/// Ordered mutations for one pass: creates, then updates, then deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPlan {
    pub window: SyncWindow,
    pub mutations: Vec<Mutation>,
    /// Matched events that need no change
    pub unchanged: usize,
    /// Scraped meetings dropped because they couldn't be normalized
    pub invalid: usize,
    /// Scraped meetings dropped because an earlier one had the same key
    pub duplicates: usize,
    /// Canonical events processed
    pub total: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn count(&self, kind: MutationKind) -> usize {
        self.mutations.iter().filter(|m| m.kind() == kind).count()
    }

    pub fn iter_kind(&self, kind: MutationKind) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter().filter(move |m| m.kind() == kind)
    }
}
