//! Creates a valid Google session (access token) that we can use to call the gcal API

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};

use crate::app_config::{AppConfig, base_dir};
use crate::error::AuthRequired;

/// Refresh a little early so a token can't expire mid-request.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub struct Session {
    account_email: String,
    data: SessionData,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        let expires_at = Utc::now() + Duration::seconds(tokens.expires_in);

        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at,
        }
    }
}

fn session_dir() -> Result<PathBuf> {
    Ok(base_dir()?.join("session"))
}

fn path_in(dir: &Path, account_email: &str) -> PathBuf {
    let email_slug = account_email.replace(['/', '\\', ':'], "_");
    dir.join(format!("{}.toml", email_slug))
}

/// Accounts with a stored session in `dir`, sorted.
fn stored_accounts(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut accounts: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    accounts.sort();
    accounts
}

/// Pick the account to act as: the requested one, or the only one stored.
fn pick_account(requested: Option<&str>, stored: &[String]) -> Result<String> {
    if let Some(account) = requested {
        return Ok(account.to_string());
    }

    match stored {
        [] => Err(AuthRequired(
            "No Google account is authenticated. Run `civicsync auth` first.".into(),
        )
        .into()),
        [only] => Ok(only.clone()),
        many => anyhow::bail!(
            "Several Google accounts are authenticated ({}). Set `account` in your civicsync config.",
            many.join(", ")
        ),
    }
}

impl Session {
    pub fn new(account_email: &str, tokens: &AccessToken) -> Self {
        Session {
            account_email: account_email.to_string(),
            data: tokens.into(),
        }
    }

    pub fn client(&self) -> Result<Client> {
        let app_config = AppConfig::load()?;

        Ok(Client::new(
            app_config.client_id,
            app_config.client_secret,
            String::new(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        ))
    }

    /// Load the session for `account` (or the only stored one) and refresh it if expired.
    pub async fn load_valid(account: Option<&str>) -> Result<Self> {
        let dir = session_dir()?;
        let account_email = pick_account(account, &stored_accounts(&dir))?;
        let mut session = Self::load_from(&dir, &account_email)?;

        if session.is_expired() {
            log::info!("Refreshing Google session for {}", session.account_email);
            session.refresh().await?;
        }

        Ok(session)
    }

    fn load_from(dir: &Path, account_email: &str) -> Result<Self> {
        let path = path_in(dir, account_email);

        if !path.exists() {
            return Err(AuthRequired(format!(
                "Google OAuth session for {} not found. Run `civicsync auth` first.",
                account_email
            ))
            .into());
        }

        let contents = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read Google OAuth session from {}",
                path.display()
            )
        })?;

        let data: SessionData = toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse Google OAuth session from {}",
                path.display()
            )
        })?;

        Ok(Session {
            account_email: account_email.to_string(),
            data,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&session_dir()?)
    }

    fn save_to(&self, dir: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let path = path_in(dir, &self.account_email);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Set to owner-only (0600) since file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.data.expires_at
    }

    async fn refresh(&mut self) -> Result<()> {
        let client = self.client()?;

        let mut tokens = client.refresh_access_token().await.map_err(|e| {
            AuthRequired(format!(
                "Failed to refresh Google session for {} ({}). Run `civicsync auth` again.",
                self.account_email, e
            ))
        })?;

        // Google typically doesn't return a new refresh_token on refresh
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()?;

        Ok(())
    }
}
