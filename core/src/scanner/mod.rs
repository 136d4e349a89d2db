//! Port scanning with platform-specific implementations.
//!
//! Both variants are compiled everywhere so they can be tested against a
//! fake [`System`]; [`PortScanner`] picks the one for the build target.

mod darwin;
mod linux;
mod parse;
mod system;
mod utils;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::PortRange;
use crate::domain::Server;
use crate::error::{Error, Result};

pub use darwin::DarwinScanner;
pub use linux::LinuxScanner;
pub use parse::{parse_lsof_output, parse_proc_net_tcp, parse_ss_output};
pub use system::{HostSystem, System};

/// Discovers TCP servers listening on localhost.
pub trait Scanner: Send + Sync {
    /// Scan listening TCP ports, in discovery order, filtered by port range.
    fn scan(&self) -> impl Future<Output = Result<Vec<Server>>> + Send;
}

/// The scanner for the current platform.
pub struct PortScanner {
    #[cfg(target_os = "linux")]
    inner: LinuxScanner,

    #[cfg(not(target_os = "linux"))]
    inner: DarwinScanner,
}

impl PortScanner {
    /// Create a port scanner for the current platform.
    pub fn new(port_range: PortRange) -> Self {
        Self {
            #[cfg(target_os = "linux")]
            inner: LinuxScanner::new(port_range),

            #[cfg(not(target_os = "linux"))]
            inner: DarwinScanner::new(port_range),
        }
    }
}

impl Scanner for PortScanner {
    async fn scan(&self) -> Result<Vec<Server>> {
        self.inner.scan().await
    }
}

/// A scanner returning canned results, for tests and demos.
#[derive(Debug, Default)]
pub struct MockScanner {
    servers: Vec<Server>,
    error: Option<String>,
    scans: AtomicUsize,
}

impl MockScanner {
    pub fn new(servers: Vec<Server>) -> Self {
        Self {
            servers,
            ..Self::default()
        }
    }

    /// A scanner whose every scan fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of scans performed so far.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl Scanner for MockScanner {
    async fn scan(&self) -> Result<Vec<Server>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(Error::CommandFailed(message.clone())),
            None => Ok(self.servers.clone()),
        }
    }
}
