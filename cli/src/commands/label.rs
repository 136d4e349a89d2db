//! Label commands - name ports without opening the TUI.

use anyhow::Result;
use portview_core::ConfigStore;

pub async fn set(store: &ConfigStore, port: u16, text: &str) -> Result<()> {
    let mut config = store.load().await?;
    let text = text.trim();

    if text.is_empty() {
        config.remove_label(port);
        store.save(&config).await?;
        println!("Removed label for port {}", port);
    } else {
        config.set_label(port, text);
        store.save(&config).await?;
        println!("Labeled port {} as \"{}\"", port, text);
    }
    Ok(())
}

pub async fn remove(store: &ConfigStore, port: u16) -> Result<()> {
    let mut config = store.load().await?;

    if config.label_for(port).is_none() {
        println!("Port {} has no label", port);
        return Ok(());
    }

    config.remove_label(port);
    store.save(&config).await?;
    println!("Removed label for port {}", port);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ConfigStore {
        ConfigStore::with_path(dir.path().join("config.yaml"))
    }

    #[tokio::test]
    async fn test_set_and_remove_label() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        set(&store, 8080, "  web-api ").await.unwrap();
        let config = store.load().await.unwrap();
        assert_eq!(config.label_for(8080), Some("web-api"));

        remove(&store, 8080).await.unwrap();
        let config = store.load().await.unwrap();
        assert_eq!(config.label_for(8080), None);
    }

    #[tokio::test]
    async fn test_blank_label_removes() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        set(&store, 3000, "api").await.unwrap();
        set(&store, 3000, "   ").await.unwrap();

        assert!(store.load().await.unwrap().labels.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_label_does_not_write() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        remove(&store, 3000).await.unwrap();
        assert!(!store.path().exists());
    }
}
