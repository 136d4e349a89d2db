//! Hidden port commands.

use anyhow::Result;
use portview_core::ConfigStore;

pub async fn add(store: &ConfigStore, port: u16) -> Result<()> {
    let mut config = store.load().await?;

    if config.hide(port) {
        store.save(&config).await?;
        println!("Port {} is now hidden", port);
    } else {
        println!("Port {} is already hidden", port);
    }
    Ok(())
}

pub async fn remove(store: &ConfigStore, port: u16) -> Result<()> {
    let mut config = store.load().await?;

    if config.unhide(port) {
        store.save(&config).await?;
        println!("Port {} is no longer hidden", port);
    } else {
        println!("Port {} is not hidden", port);
    }
    Ok(())
}

pub async fn list(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;
    let mut ports = config.hidden.clone();
    ports.sort_unstable();

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("No hidden ports.");
        return Ok(());
    }

    println!("Hidden ports:");
    for port in ports {
        match config.label_for(port) {
            Some(label) => println!("  {} ({})", port, label),
            None => println!("  {}", port),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_add_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.yaml"));

        add(&store, 22).await.unwrap();
        add(&store, 22).await.unwrap();
        add(&store, 5432).await.unwrap();
        assert_eq!(store.load().await.unwrap().hidden, vec![22, 5432]);

        remove(&store, 22).await.unwrap();
        assert_eq!(store.load().await.unwrap().hidden, vec![5432]);

        remove(&store, 9999).await.unwrap();
        assert_eq!(store.load().await.unwrap().hidden, vec![5432]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.yaml"));

        list(&store, false).await.unwrap();
        list(&store, true).await.unwrap();
    }
}
