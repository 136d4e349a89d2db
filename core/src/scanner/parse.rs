//! Parsers for the raw listing formats.
//!
//! Malformed lines are skipped silently. The listing parsers return `None`
//! rather than an empty list when nothing matched.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Server;

use super::utils::Utils;

/// Trailing marker on lsof lines for listening sockets.
const LSOF_LISTEN_MARKER: &str = "(LISTEN)";

/// `st` code for TCP_LISTEN in `/proc/net/tcp`.
const PROC_LISTEN_STATE: &str = "0A";

static SS_PID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pid=([^,)]*)[,)]").expect("valid pid regex"));

/// Data lines of a listing, or `None` if there is nothing past the header.
fn data_lines(output: &str) -> Option<std::iter::Skip<std::str::Lines<'_>>> {
    let trimmed = output.trim();
    if trimmed.lines().nth(1).is_none() {
        return None;
    }
    Some(trimmed.lines().skip(1))
}

fn non_empty(servers: Vec<Server>) -> Option<Vec<Server>> {
    if servers.is_empty() {
        None
    } else {
        Some(servers)
    }
}

/// Parse `lsof -iTCP -sTCP:LISTEN -nP` output.
///
/// Expected format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
pub fn parse_lsof_output(output: &str) -> Option<Vec<Server>> {
    let mut servers = Vec::new();

    for line in data_lines(output)? {
        // COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME (LISTEN)
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }

        let pid: u32 = match fields[1].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        if fields[fields.len() - 1] != LSOF_LISTEN_MARKER {
            continue;
        }

        let Some(port) = Utils::port_from_address(fields[fields.len() - 2]) else {
            continue;
        };

        let process = Utils::unescape_process_name(fields[0]);
        servers.push(Server::with_owner(port, pid, process));
    }

    non_empty(servers)
}

/// Parse the contents of `/proc/net/tcp`.
///
/// Expected format:
/// ```text
///   sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
///    0: 00000000:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 12345 ...
/// ```
///
/// Only LISTEN records produce servers, and only the port is known.
pub fn parse_proc_net_tcp(content: &str) -> Option<Vec<Server>> {
    let mut servers = Vec::new();

    for line in data_lines(content)? {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }

        if fields[3] != PROC_LISTEN_STATE {
            continue;
        }

        // local_address is hex_ip:hex_port
        let parts: Vec<&str> = fields[1].split(':').collect();
        if parts.len() != 2 {
            continue;
        }

        let port = match u16::from_str_radix(parts[1], 16) {
            Ok(p) => p,
            Err(_) => continue,
        };

        servers.push(Server::listening(port));
    }

    non_empty(servers)
}

/// Parse `ss -tlnp` output into a port → PID map.
///
/// Expected format:
/// ```text
/// State  Recv-Q Send-Q Local Address:Port Peer Address:Port Process
/// LISTEN 0      128    0.0.0.0:8080       0.0.0.0:*         users:(("node",pid=1234,fd=12))
/// ```
///
/// Lines without a usable port or PID are left out of the map.
pub fn parse_ss_output(output: &str) -> HashMap<u16, u32> {
    let mut port_pids = HashMap::new();
    let Some(lines) = data_lines(output) else {
        return port_pids;
    };

    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }

        let Some(port) = Utils::port_from_address(fields[3]) else {
            continue;
        };

        if let Some(pid) = extract_ss_pid(&fields[4..].join(" ")) {
            port_pids.insert(port, pid);
        }
    }

    port_pids
}

/// Find the first `pid=<digits>` terminated by `,` or `)`.
fn extract_ss_pid(text: &str) -> Option<u32> {
    let caps = SS_PID.captures(text)?;
    caps[1].parse().ok().filter(|&pid| pid > 0)
}
