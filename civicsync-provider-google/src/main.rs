//! civicsync-provider-google - Google Calendar provider for civicsync
//!
//! This binary implements the civicsync provider protocol, communicating
//! with civicsync via JSON over stdin/stdout. Logs go to stderr.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/civicsync/providers/google/app_config.toml (or credentials.json)
//!   ~/.config/civicsync/providers/google/session/{account}.toml

mod app_config;
mod commands;
mod error;
mod google_event;
mod session;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use civicsync_core::remote::protocol::{Command, ProviderCommand, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::error_kind;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {}", e)),
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    log::debug!("Handling {:?}", request.command);

    match request.command {
        Command::Authenticate => dispatch(request.params, commands::authenticate::handle).await,
        Command::EnsureCalendar => {
            dispatch(request.params, commands::ensure_calendar::handle).await
        }
        Command::ListEvents => dispatch(request.params, commands::list_events::handle).await,
        Command::CreateEvent => dispatch(request.params, commands::create_event::handle).await,
        Command::UpdateEvent => dispatch(request.params, commands::update_event::handle).await,
        Command::DeleteEvent => dispatch(request.params, commands::delete_event::handle).await,
    }
}

/// Deserialize params into the typed command, run its handler and encode the response.
async fn dispatch<C, F, Fut>(params: serde_json::Value, handler: F) -> String
where
    C: ProviderCommand + DeserializeOwned,
    C::Response: Serialize,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = Result<C::Response>>,
{
    let cmd: C = match serde_json::from_value(params) {
        Ok(c) => c,
        Err(e) => return Response::error(&format!("Invalid params: {}", e)),
    };

    match handler(cmd).await {
        Ok(data) => Response::success(data),
        Err(e) => {
            log::debug!("Command failed: {:#}", e);
            Response::error_of_kind(&format!("{:#}", e), error_kind(&e))
        }
    }
}
