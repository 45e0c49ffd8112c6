//! Config command - show and edit policy settings.

use anyhow::Result;
use killonstart_core::ConfigStore;

pub async fn show(json: bool) -> Result<()> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file:       {}", store.config_path().display());
    println!("Message:           {}", config.message());
    println!(
        "More info URL:     {}",
        config.custom_url.as_deref().unwrap_or("-")
    );
    println!("Default grace:     {}s", config.default_grace_period_secs);
    println!("Confirmation time: {}ms", config.confirmation_display_ms);
    Ok(())
}

pub async fn set_message(text: Option<String>) -> Result<()> {
    ConfigStore::new()?.set_custom_message(text).await?;
    println!("Message updated");
    Ok(())
}

pub async fn set_url(url: Option<String>) -> Result<()> {
    ConfigStore::new()?.set_custom_url(url).await?;
    println!("URL updated");
    Ok(())
}

pub async fn set_grace(seconds: u64) -> Result<()> {
    ConfigStore::new()?.set_default_grace_period(seconds).await?;
    println!("Default grace period set to {}s", seconds);
    Ok(())
}

pub async fn set_display(millis: u64) -> Result<()> {
    ConfigStore::new()?.set_confirmation_display_ms(millis).await?;
    println!("Confirmation display set to {}ms", millis);
    Ok(())
}
