//! App-level configuration for the Google provider.
//!
//! User-provided OAuth credentials, read from the first that exists of:
//!   ~/.config/civicsync/providers/google/app_config.toml
//!   ~/.config/civicsync/providers/google/credentials.json (as downloaded from Google Cloud)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AuthRequired;

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Shape of the OAuth client JSON the Google Cloud console hands out.
#[derive(Deserialize)]
struct DownloadedCredentials {
    installed: Option<AppConfig>,
    web: Option<AppConfig>,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("civicsync")
        .join("providers")
        .join("google"))
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&base_dir()?)
    }

    fn load_from(dir: &Path) -> Result<Self> {
        let toml_path = dir.join("app_config.toml");
        if toml_path.exists() {
            let contents = std::fs::read_to_string(&toml_path).with_context(|| {
                format!("Failed to read credentials from {}", toml_path.display())
            })?;
            return toml::from_str(&contents).with_context(|| {
                format!("Failed to parse credentials from {}", toml_path.display())
            });
        }

        let json_path = dir.join("credentials.json");
        if json_path.exists() {
            let contents = std::fs::read_to_string(&json_path).with_context(|| {
                format!("Failed to read credentials from {}", json_path.display())
            })?;
            return parse_downloaded(&contents).with_context(|| {
                format!("Failed to parse credentials from {}", json_path.display())
            });
        }

        Err(AuthRequired(format!(
            "Google credentials not found.\n\n\
            Create {} with:\n\n\
            client_id = \"your-client-id.apps.googleusercontent.com\"\n\
            client_secret = \"your-client-secret\"\n\n\
            or save the OAuth client JSON from \
            https://console.cloud.google.com/apis/credentials as {}",
            toml_path.display(),
            json_path.display()
        ))
        .into())
    }
}

fn parse_downloaded(contents: &str) -> Result<AppConfig> {
    let downloaded: DownloadedCredentials = serde_json::from_str(contents)?;
    downloaded
        .installed
        .or(downloaded.web)
        .context("Expected an \"installed\" or \"web\" OAuth client")
}
