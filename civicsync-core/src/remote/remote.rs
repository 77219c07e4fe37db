//! Remote calendar operations via providers.

use log::info;

use crate::config::SyncConfig;
use crate::constants::{CALENDAR_DESCRIPTION, CALENDAR_SUMMARY};
use crate::error::SyncResult;
use crate::event::{CanonicalEvent, RemoteEvent};
use crate::remote::protocol::{
    CreateEvent, DeleteEvent, EnsureCalendar, ListEvents, RemoteConfig, UpdateEvent,
};
use crate::remote::provider::Provider;
use crate::store::EventStore;
use crate::window::SyncWindow;

/// A calendar held by a provider, addressed by account and calendar id.
#[derive(Debug, Clone)]
pub struct Remote {
    pub provider: Provider,
    pub config: RemoteConfig,
    /// IANA name sent along with timed events
    pub time_zone: String,
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig, time_zone: impl Into<String>) -> Self {
        Remote {
            provider,
            config,
            time_zone: time_zone.into(),
        }
    }

    /// Resolve the target calendar for `config`, creating it when none is configured
    /// or the configured one no longer exists.
    pub async fn connect(config: &SyncConfig) -> SyncResult<Self> {
        let provider = Provider::from_name(&config.provider);
        let time_zone = config.timezone.name().to_string();

        let calendar_id = provider
            .call(EnsureCalendar {
                account: config.account.clone(),
                calendar_id: config.calendar_id.clone(),
                summary: CALENDAR_SUMMARY.to_string(),
                description: CALENDAR_DESCRIPTION.to_string(),
                time_zone: time_zone.clone(),
            })
            .await?;

        if config.calendar_id.as_deref() != Some(calendar_id.as_str()) {
            info!("Using calendar {calendar_id}; set calendar_id in your config to keep it");
        }

        Ok(Remote::new(
            provider,
            RemoteConfig {
                account: config.account.clone(),
                calendar_id,
            },
            time_zone,
        ))
    }

    /// The configured calendar, without contacting the provider.
    /// `None` when no calendar id is configured yet.
    pub fn from_config(config: &SyncConfig) -> Option<Self> {
        let calendar_id = config.calendar_id.clone()?;

        Some(Remote::new(
            Provider::from_name(&config.provider),
            RemoteConfig {
                account: config.account.clone(),
                calendar_id,
            },
            config.timezone.name(),
        ))
    }

    pub fn calendar_id(&self) -> &str {
        &self.config.calendar_id
    }
}

impl EventStore for Remote {
    async fn list(&self, window: &SyncWindow) -> SyncResult<Vec<RemoteEvent>> {
        self.provider
            .call(ListEvents {
                remote_config: self.config.clone(),
                from: window.from_rfc3339(),
                to: window.to_rfc3339(),
            })
            .await
    }

    async fn create(&self, event: &CanonicalEvent) -> SyncResult<RemoteEvent> {
        self.provider
            .call(CreateEvent {
                remote_config: self.config.clone(),
                event: event.clone(),
                time_zone: self.time_zone.clone(),
            })
            .await
    }

    async fn update(&self, id: &str, event: &CanonicalEvent) -> SyncResult<RemoteEvent> {
        self.provider
            .call(UpdateEvent {
                remote_config: self.config.clone(),
                event_id: id.to_string(),
                event: event.clone(),
                time_zone: self.time_zone.clone(),
            })
            .await
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.config.clone(),
                event_id: id.to_string(),
            })
            .await
    }
}
