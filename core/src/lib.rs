//! portview Core Library
//!
//! Discovery and management of TCP servers listening on localhost.
//! Provides functionality to:
//! - Scan listening TCP ports with their owning processes
//! - Probe each server's liveness concurrently
//! - Merge user labels and hidden ports into scan results
//! - Persist user configuration as YAML
//! - Signal server processes and open them in a browser
//!
//! # Platform Support
//! - Linux: Reads `/proc/net/tcp`, resolves owners with `ss`
//! - macOS and other Unix: Uses `lsof` and `ps` commands

pub mod browser;
pub mod config;
pub mod domain;
pub mod error;
pub mod health;
pub mod killer;
pub mod reconcile;
pub mod scanner;

pub use browser::open_in_browser;
pub use config::{Config, ConfigStore, PortRange};
pub use domain::{Server, LISTEN_STATE};
pub use error::{Error, Result};
pub use health::check_health;
pub use killer::ProcessKiller;
pub use reconcile::{apply_filter, clamp_cursor, filter_hidden, merge_labels, reconcile};
pub use scanner::{MockScanner, PortScanner, Scanner};
