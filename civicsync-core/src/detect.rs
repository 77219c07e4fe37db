//! Change detection for matched canonical/remote pairs.
//!
//! Title and start form the match key and are equal by construction, so
//! only description, location and end are compared.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{CanonicalEvent, EventTime, RemoteEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Description,
    Location,
    End,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Description => write!(f, "description"),
            Field::Location => write!(f, "location"),
            Field::End => write!(f, "end"),
        }
    }
}

/// One drifted field: what the remote has now and what it should have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: Field,
    pub old: Option<String>,
    pub new: String,
}

/// Fields of `remote` that differ from `canonical`.
pub fn changed_fields(canonical: &CanonicalEvent, remote: &RemoteEvent) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if remote.description.as_deref() != Some(canonical.description.as_str()) {
        changes.push(FieldChange {
            field: Field::Description,
            old: remote.description.clone(),
            new: canonical.description.clone(),
        });
    }

    if remote.location.as_deref() != Some(canonical.location.as_str()) {
        changes.push(FieldChange {
            field: Field::Location,
            old: remote.location.clone(),
            new: canonical.location.clone(),
        });
    }

    let canonical_end = EventTime::DateTime(canonical.end);
    let end_matches = remote
        .end
        .as_ref()
        .is_some_and(|end| end.same_as(&canonical_end));
    if !end_matches {
        changes.push(FieldChange {
            field: Field::End,
            old: remote.end.as_ref().map(EventTime::to_string),
            new: canonical_end.to_string(),
        });
    }

    changes
}

/// Whether the remote event must be updated to match the canonical one.
pub fn needs_update(canonical: &CanonicalEvent, remote: &RemoteEvent) -> bool {
    !changed_fields(canonical, remote).is_empty()
}
