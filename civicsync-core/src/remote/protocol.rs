//! Defines the JSON protocol used for communication between civicsync
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{CanonicalEvent, RemoteEvent};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Authenticate,
    EnsureCalendar,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

/// Request sent from civicsync to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Lets the caller tell lost credentials apart from ordinary failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    #[default]
    Other,
}

/// Response sent from provider to civicsync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        #[serde(default)]
        kind: ErrorKind,
    },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|e| Response::<()>::error(&format!("Failed to serialize response: {e}")))
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        Self::error_of_kind(msg, ErrorKind::Other)
    }

    pub fn error_of_kind(msg: &str, kind: ErrorKind) -> String {
        let response = Response::<()>::Error {
            error: msg.to_string(),
            kind,
        };
        // A struct of two strings always serializes
        serde_json::to_string(&response).unwrap_or_default()
    }
}

/// Where on the provider side events live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Provider account; providers with a single stored account may omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub calendar_id: String,
}

/// Run the provider's interactive authentication.
#[derive(Debug, Serialize, Deserialize)]
pub struct Authenticate {}

impl ProviderCommand for Authenticate {
    type Response = String; // Account identifier (e.g., email)
    fn command() -> Command {
        Command::Authenticate
    }
}

/// Confirm `calendar_id` exists, or create a calendar with the given metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct EnsureCalendar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    pub summary: String,
    pub description: String,
    pub time_zone: String,
}

impl ProviderCommand for EnsureCalendar {
    type Response = String; // Confirmed calendar id
    fn command() -> Command {
        Command::EnsureCalendar
    }
}

/// List events starting within a time range.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub event: CanonicalEvent,
    pub time_zone: String,
}

impl ProviderCommand for CreateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Overwrite an existing event.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub event_id: String,
    pub event: CanonicalEvent,
    pub time_zone: String,
}

impl ProviderCommand for UpdateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::UpdateEvent
    }
}

/// Delete an event by ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}
