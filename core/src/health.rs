//! Concurrent TCP liveness probing.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::Server;

/// Try to connect to `127.0.0.1:<port>` within `limit`.
pub async fn probe(port: u16, limit: Duration) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    match timeout(limit, TcpStream::connect(addr)).await {
        // Dropping the stream closes the connection
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!(port, error = %e, "Probe refused");
            false
        }
        Err(_) => {
            debug!(port, "Probe timed out");
            false
        }
    }
}

/// Probe every server concurrently and return copies with `healthy` set.
///
/// The input is never modified. Each probe is capped by `limit`, all probes
/// run at once, and the result is index-aligned with `servers`.
pub async fn check_health(servers: &[Server], limit: Duration) -> Vec<Server> {
    let mut results: Vec<Server> = servers
        .iter()
        .map(|server| server.clone().with_health(false))
        .collect();

    let mut probes = JoinSet::new();
    for (index, server) in servers.iter().enumerate() {
        let port = server.port;
        probes.spawn(async move { (index, probe(port, limit).await) });
    }

    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok((index, healthy)) => results[index].healthy = healthy,
            Err(e) => warn!(error = %e, "Health probe task failed"),
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    /// A port that was just bound and released, so nothing listens on it.
    async fn closed_port() -> u16 {
        let (listener, port) = listener().await;
        drop(listener);
        port
    }

    #[tokio::test]
    async fn test_responsive_port_is_healthy() {
        let (_listener, port) = listener().await;
        let servers = vec![Server::with_owner(port, 1, "test")];
        let snapshot = servers.clone();

        let result = check_health(&servers, Duration::from_secs(2)).await;

        assert_eq!(result.len(), 1);
        assert!(result[0].healthy);
        assert_eq!(servers, snapshot);
    }

    #[tokio::test]
    async fn test_closed_port_is_unhealthy() {
        let port = closed_port().await;
        let servers = vec![Server::with_owner(port, 1, "ghost").with_health(true)];

        let result = check_health(&servers, Duration::from_millis(200)).await;

        assert!(!result[0].healthy);
        assert!(servers[0].healthy);
    }

    #[tokio::test]
    async fn test_concurrent_checks_keep_order() {
        let (_first, port1) = listener().await;
        let (_second, port2) = listener().await;
        let ghost = closed_port().await;

        let servers = vec![
            Server::with_owner(port1, 1, "svc1"),
            Server::with_owner(ghost, 2, "ghost"),
            Server::with_owner(port2, 3, "svc2"),
        ];

        let result = check_health(&servers, Duration::from_millis(500)).await;

        let got: Vec<(u16, bool)> = result.iter().map(|s| (s.port, s.healthy)).collect();
        assert_eq!(got, vec![(port1, true), (ghost, false), (port2, true)]);
        assert_eq!(result[1].process, "ghost");
    }

    #[tokio::test]
    async fn test_probes_run_in_parallel() {
        let mut listeners = Vec::new();
        let mut servers = Vec::new();
        for _ in 0..8 {
            let (listener, port) = listener().await;
            listeners.push(listener);
            servers.push(Server::listening(port));
        }

        let start = Instant::now();
        let result = check_health(&servers, Duration::from_millis(300)).await;

        assert!(result.iter().all(|s| s.healthy));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let result = check_health(&[], Duration::from_millis(100)).await;
        assert!(result.is_empty());
    }
}
