//! Listening server domain model.

use serde::{Deserialize, Serialize};

/// Connection state reported for every discovered server.
pub const LISTEN_STATE: &str = "LISTEN";

/// A TCP server listening on localhost plus its resolved metadata.
///
/// Servers are value objects: a scan produces a fresh set every cycle and
/// derived fields (`label`, `healthy`) are set through the `with_*` builders
/// on copies rather than by mutating a previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Server {
    /// The port number; the key for label and hidden lookups.
    pub port: u16,
    /// Owning process ID, or 0 when it could not be resolved.
    pub pid: u32,
    /// Short process name, empty when unresolved.
    pub process: String,
    /// Full command line, empty when unresolved.
    pub command: String,
    /// Connection state, always [`LISTEN_STATE`] for scanned servers.
    pub state: String,
    /// User label merged from configuration.
    pub label: String,
    /// Whether the last health probe connected successfully.
    pub healthy: bool,
}

impl Server {
    /// A listening server known only by its port.
    pub fn listening(port: u16) -> Self {
        Self {
            port,
            state: LISTEN_STATE.to_string(),
            ..Self::default()
        }
    }

    /// A listening server with its owning process already known.
    pub fn with_owner(port: u16, pid: u32, process: impl Into<String>) -> Self {
        Self {
            pid,
            process: process.into(),
            ..Self::listening(port)
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_process(mut self, process: impl Into<String>) -> Self {
        self.process = process.into();
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_health(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    /// Whether the owning process was resolved.
    pub fn has_owner(&self) -> bool {
        self.pid != 0
    }

    /// URL opened by the "open in browser" action.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Check whether this server matches a live filter query.
    ///
    /// Process name and label match case-insensitively; the port matches
    /// when the query is a substring of its decimal text, without case
    /// folding. An empty query matches everything.
    pub fn matches_filter(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_lowercase();
        self.process.to_lowercase().contains(&query_lower)
            || self.label.to_lowercase().contains(&query_lower)
            || self.port.to_string().contains(query)
    }
}

impl std::fmt::Display for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            ":{} (PID: {}, Process: {})",
            self.port, self.pid, self.process
        )
    }
}
