//! Config command - show the resolved configuration.

use anyhow::Result;
use portview_core::ConfigStore;

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;

    if json {
        let value = serde_json::json!({
            "path": store.path(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let exists = if store.path().exists() { "" } else { " (not created yet)" };
    println!("Config file: {}{}", store.path().display(), exists);
    println!();
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
