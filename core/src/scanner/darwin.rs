//! lsof-based scanner for macOS and other Unix systems without procfs.

use tracing::{debug, warn};

use crate::config::PortRange;
use crate::domain::Server;
use crate::error::Result;

use super::parse::parse_lsof_output;
use super::system::{HostSystem, System};
use super::Scanner;

/// Scanner using `lsof` for discovery and `ps` for process details.
pub struct DarwinScanner<S = HostSystem> {
    system: S,
    port_range: PortRange,
}

impl DarwinScanner {
    /// Create a scanner against the host system.
    pub fn new(port_range: PortRange) -> Self {
        Self::with_system(HostSystem, port_range)
    }
}

impl<S: System> DarwinScanner<S> {
    pub fn with_system(system: S, port_range: PortRange) -> Self {
        Self { system, port_range }
    }

    /// Refine a server's process name and command line with `ps`.
    ///
    /// Executes: `ps -p <pid> -o comm=,args=`
    ///
    /// lsof truncates command names, so the `ps` name replaces it only when
    /// it is longer. On any failure the server is returned unchanged.
    async fn resolve_process(&self, server: Server) -> Server {
        let pid = server.pid.to_string();
        let output = match self
            .system
            .run("ps", &["-p", &pid, "-o", "comm=,args="])
            .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!(pid = server.pid, error = %e, "ps lookup failed");
                return server;
            }
        };

        let line = output.trim();
        if line.is_empty() {
            return server;
        }

        // "comm args..."
        let (comm, args) = match line.split_once(' ') {
            Some((comm, args)) => (comm, Some(args.trim())),
            None => (line, None),
        };

        let mut server = server;
        if let Some(args) = args {
            server = server.with_command(args);
        }
        if comm.len() > server.process.len() {
            server = server.with_process(comm);
        }
        server
    }
}

impl<S: System> Scanner for DarwinScanner<S> {
    /// Scan listening TCP ports using lsof.
    ///
    /// Executes: `lsof -iTCP -sTCP:LISTEN -nP`
    ///
    /// Flags explained:
    /// - -iTCP: Show only TCP connections
    /// - -sTCP:LISTEN: Show only listening sockets
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - -P: Show port numbers (don't resolve to service names)
    async fn scan(&self) -> Result<Vec<Server>> {
        let output = self
            .system
            .run("lsof", &["-iTCP", "-sTCP:LISTEN", "-nP"])
            .await
            .inspect_err(|e| warn!(error = %e, "lsof listing failed"))?;

        let Some(discovered) = parse_lsof_output(&output) else {
            return Ok(Vec::new());
        };

        let mut servers = Vec::with_capacity(discovered.len());
        for server in discovered {
            if !self.port_range.contains(u32::from(server.port)) {
                continue;
            }
            servers.push(self.resolve_process(server).await);
        }

        debug!(count = servers.len(), "lsof scan complete");
        Ok(servers)
    }
}
