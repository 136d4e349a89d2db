//! Configuration for refresh timing, port range, labels and hidden ports.
//!
//! Stored as YAML at `$XDG_CONFIG_HOME/portview/config.yaml`, falling back to
//! `~/.config/portview/config.yaml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};

const APP_DIR: &str = "portview";
const CONFIG_FILE: &str = "config.yaml";

fn default_refresh_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_probe_timeout() -> Duration {
    Duration::from_millis(500)
}

/// Inclusive port range used to filter scan results.
///
/// A zero bound is disabled; with both bounds zero every port passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortRange {
    pub min: u32,
    pub max: u32,
}

impl PortRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range that accepts every port.
    pub fn unbounded() -> Self {
        Self { min: 0, max: 0 }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    pub fn contains(&self, port: u32) -> bool {
        (self.min == 0 || port >= self.min) && (self.max == 0 || port <= self.max)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            min: 1024,
            max: 65535,
        }
    }
}

/// Configuration document.
///
/// Missing fields keep their defaults; present fields replace them, so a
/// partial file overlays the defaults field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How often the interactive view rescans.
    #[serde(with = "duration_format")]
    pub refresh_interval: Duration,

    /// Per-probe connect timeout for health checks.
    #[serde(with = "duration_format")]
    pub probe_timeout: Duration,

    /// Ports outside this range are dropped from scan results.
    pub port_range: PortRange,

    /// User labels keyed by port.
    pub labels: BTreeMap<u16, String>,

    /// Ports never shown.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            probe_timeout: default_probe_timeout(),
            port_range: PortRange::default(),
            labels: BTreeMap::new(),
            hidden: Vec::new(),
        }
    }
}

impl Config {
    pub fn label_for(&self, port: u16) -> Option<&str> {
        self.labels.get(&port).map(String::as_str)
    }

    pub fn set_label(&mut self, port: u16, label: impl Into<String>) {
        self.labels.insert(port, label.into());
    }

    pub fn remove_label(&mut self, port: u16) {
        self.labels.remove(&port);
    }

    pub fn is_hidden(&self, port: u16) -> bool {
        self.hidden.contains(&port)
    }

    /// Add a port to the hidden set. Returns false if it was already hidden.
    pub fn hide(&mut self, port: u16) -> bool {
        if self.is_hidden(port) {
            return false;
        }
        self.hidden.push(port);
        true
    }

    /// Remove a port from the hidden set. Returns false if it was not hidden.
    pub fn unhide(&mut self, port: u16) -> bool {
        let before = self.hidden.len();
        self.hidden.retain(|&p| p != port);
        self.hidden.len() != before
    }

    /// Flip hidden status for a port. Returns whether it is now hidden.
    pub fn toggle_hidden(&mut self, port: u16) -> bool {
        if self.unhide(port) {
            false
        } else {
            self.hide(port)
        }
    }

    pub fn in_port_range(&self, port: u32) -> bool {
        self.port_range.contains(port)
    }
}

/// Resolve the config path from an XDG config dir and a home dir.
fn resolve_config_path(xdg_config_home: Option<&str>, home: Option<PathBuf>) -> Result<PathBuf> {
    let base = match xdg_config_home.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?
            .join(".config"),
    };
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Default config file location for the current user.
pub fn default_path() -> Result<PathBuf> {
    let xdg = std::env::var("XDG_CONFIG_HOME").ok();
    resolve_config_path(xdg.as_deref(), dirs::home_dir())
}

/// Reads and writes the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a config store at the default path.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: default_path()?,
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// A missing or empty file yields defaults; a malformed file is an error.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save configuration to disk, replacing the previous file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
                fs::create_dir_all(config_dir).await.map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = serde_yaml::to_string(config)?;

        // Write to a sibling temp file, then rename over the target
        let temp_path = self.config_path.with_extension("yaml.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        debug!(path = %self.config_path.display(), "Config saved");
        Ok(())
    }
}

/// Human-readable durations such as `3s`, `500ms` or `1m30s`.
///
/// Bare integers are read as seconds.
pub mod duration_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    pub fn parse(input: &str) -> Result<Duration, String> {
        humantime::parse_duration(input.trim())
            .map_err(|e| format!("invalid duration {:?}: {}", input, e))
    }

    pub fn format(duration: Duration) -> String {
        humantime::format_duration(duration).to_string()
    }

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
            RawDuration::Text(text) => parse(&text).map_err(serde::de::Error::custom),
        }
    }
}
