//! Linux scanner reading the kernel's TCP table.
//!
//! Listening sockets come from `/proc/net/tcp`; a single `ss -tlnp` call maps
//! ports to PIDs, and process details are read from `/proc/<pid>/`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::PortRange;
use crate::domain::Server;
use crate::error::Result;

use super::parse::{parse_proc_net_tcp, parse_ss_output};
use super::system::{HostSystem, System};
use super::Scanner;

const PROC_NET_TCP: &str = "/proc/net/tcp";

/// Linux-specific port scanner.
pub struct LinuxScanner<S = HostSystem> {
    system: S,
    port_range: PortRange,
}

impl LinuxScanner {
    /// Create a scanner against the host system.
    pub fn new(port_range: PortRange) -> Self {
        Self::with_system(HostSystem, port_range)
    }
}

impl<S: System> LinuxScanner<S> {
    pub fn with_system(system: S, port_range: PortRange) -> Self {
        Self { system, port_range }
    }

    /// Build a port → PID map from one `ss -tlnp` invocation.
    ///
    /// Returns an empty map if ss is unavailable.
    async fn resolve_port_pids(&self) -> HashMap<u16, u32> {
        match self.system.run("ss", &["-tlnp"]).await {
            Ok(output) => parse_ss_output(&output),
            Err(e) => {
                debug!(error = %e, "ss lookup failed, PIDs unresolved");
                HashMap::new()
            }
        }
    }

    fn proc_path(pid: u32, name: &str) -> PathBuf {
        PathBuf::from("/proc").join(pid.to_string()).join(name)
    }

    /// Short process name from `/proc/<pid>/comm`, empty on error.
    async fn read_comm(&self, pid: u32) -> String {
        match self.system.read_file(&Self::proc_path(pid, "comm")).await {
            Ok(data) => String::from_utf8_lossy(&data).trim().to_string(),
            Err(_) => String::new(),
        }
    }

    /// Full command line from the NUL-delimited `/proc/<pid>/cmdline`.
    async fn read_cmdline(&self, pid: u32) -> String {
        match self.system.read_file(&Self::proc_path(pid, "cmdline")).await {
            Ok(data) => {
                let spaced: Vec<u8> = data
                    .into_iter()
                    .map(|b| if b == 0 { b' ' } else { b })
                    .collect();
                String::from_utf8_lossy(&spaced).trim().to_string()
            }
            Err(_) => String::new(),
        }
    }
}

impl<S: System> Scanner for LinuxScanner<S> {
    async fn scan(&self) -> Result<Vec<Server>> {
        let data = self
            .system
            .read_file(Path::new(PROC_NET_TCP))
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to read {}", PROC_NET_TCP))?;

        let Some(discovered) = parse_proc_net_tcp(&String::from_utf8_lossy(&data)) else {
            return Ok(Vec::new());
        };

        let port_pids = self.resolve_port_pids().await;

        let mut servers = Vec::with_capacity(discovered.len());
        for server in discovered {
            if !self.port_range.contains(u32::from(server.port)) {
                continue;
            }

            let server = match port_pids.get(&server.port) {
                Some(&pid) => {
                    let process = self.read_comm(pid).await;
                    let command = self.read_cmdline(pid).await;
                    server
                        .with_pid(pid)
                        .with_process(process)
                        .with_command(command)
                }
                None => server,
            };
            servers.push(server);
        }

        debug!(count = servers.len(), "procfs scan complete");
        Ok(servers)
    }
}
