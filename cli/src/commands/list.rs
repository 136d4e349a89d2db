//! List command - show all listening servers.

use anyhow::Result;
use portview_core::{check_health, reconcile, ConfigStore, PortScanner, Scanner};

use crate::format::truncate;

pub async fn run(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;
    let scanner = PortScanner::new(config.port_range);

    let servers = scanner.scan().await?;
    let servers = check_health(&servers, config.probe_timeout).await;
    let servers = reconcile(servers, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&servers)?);
        return Ok(());
    }

    if servers.is_empty() {
        println!("No servers found.");
        return Ok(());
    }

    println!(
        "{:<7} {:<7} {:<15} {:<15} {:<7} COMMAND",
        "PORT", "PID", "PROCESS", "LABEL", "HEALTH"
    );
    println!("{}", "-".repeat(80));

    for server in &servers {
        let health = if server.healthy { "up" } else { "down" };
        println!(
            "{:<7} {:<7} {:<15} {:<15} {:<7} {}",
            server.port,
            server.pid,
            truncate(&server.process, 15),
            truncate(&server.label, 15),
            health,
            truncate(&server.command, 40)
        );
    }

    println!("\nTotal: {} servers", servers.len());
    Ok(())
}
