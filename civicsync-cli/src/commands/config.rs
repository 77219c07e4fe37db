use anyhow::Result;
use civicsync_core::config::SyncConfig;
use owo_colors::OwoColorize;

pub fn run(init: bool) -> Result<()> {
    let config_path = SyncConfig::config_path()?;

    if init {
        if config_path.exists() {
            println!("Config already exists at {}", config_path.display());
        } else {
            SyncConfig::create_default_config(&config_path)?;
            println!("Created {}", config_path.display());
        }
        return Ok(());
    }

    let config = SyncConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!(
        "  Providers:  {}",
        config_path
            .parent()
            .map(|p| p.join("providers"))
            .unwrap_or_default()
            .display()
    );

    println!("\n{}", "Settings".bold());
    println!("  Timezone:   {}", config.timezone.name());
    println!("  Source:     {}", config.source_url);
    println!("  Provider:   {}", config.provider);
    println!(
        "  Account:    {}",
        config.account.as_deref().unwrap_or("(only authenticated account)")
    );
    println!(
        "  Calendar:   {}",
        config
            .calendar_id
            .as_deref()
            .unwrap_or("(created on first sync)")
    );

    Ok(())
}
