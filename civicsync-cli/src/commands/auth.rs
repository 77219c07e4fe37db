use anyhow::Result;
use civicsync_core::config::SyncConfig;
use civicsync_core::remote::provider::Provider;
use owo_colors::OwoColorize;

pub async fn run(config: &SyncConfig) -> Result<()> {
    let provider = Provider::from_name(&config.provider);

    println!("Authenticating with {}...", provider.name());

    // Provider handles the full OAuth flow and stores credentials/tokens
    let account = provider.authenticate().await?;

    println!("Authenticated as: {}", account.green());

    if let Some(configured) = config.account.as_deref().filter(|c| *c != account) {
        println!(
            "{}",
            format!(
                "Note: your config uses account '{}'. Set account = \"{}\" to sync with this one.",
                configured, account
            )
            .yellow()
        );
    }

    println!("\nRun `civicsync sync` to mirror the meeting calendar.");

    Ok(())
}
