//! Kill command - signal the process listening on a port.

use anyhow::{bail, Result};
use portview_core::{ConfigStore, PortScanner, ProcessKiller, Scanner};

pub async fn run(store: &ConfigStore, port: u16, force: bool) -> Result<()> {
    let config = store.load().await?;
    let scanner = PortScanner::new(config.port_range);
    let servers = scanner.scan().await?;

    let Some(server) = servers.into_iter().find(|s| s.port == port) else {
        bail!("No server listening on port {port}");
    };
    if !server.has_owner() {
        bail!("Could not resolve the process listening on port {port}");
    }

    ProcessKiller::new().kill(server.pid, force)?;

    let signal = if force { "SIGKILL" } else { "SIGTERM" };
    println!(
        "Sent {} to {} (PID {}) on port {}",
        signal, server.process, server.pid, port
    );
    Ok(())
}
