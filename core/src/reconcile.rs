//! Merging scan results with stored labels, hidden ports and the live filter.
//!
//! Every pass takes a snapshot and returns a new one; the passes are
//! idempotent and are applied in the order label merge, hidden filter,
//! text filter.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::domain::Server;

/// Overwrite each server's label with the stored label for its port.
///
/// Servers without a stored label keep the label they were scanned with.
pub fn merge_labels(servers: Vec<Server>, labels: &BTreeMap<u16, String>) -> Vec<Server> {
    servers
        .into_iter()
        .map(|server| match labels.get(&server.port) {
            Some(label) => server.with_label(label.clone()),
            None => server,
        })
        .collect()
}

/// Drop servers whose port is hidden, preserving order.
pub fn filter_hidden(servers: Vec<Server>, hidden: &[u16]) -> Vec<Server> {
    servers
        .into_iter()
        .filter(|server| !hidden.contains(&server.port))
        .collect()
}

/// Label merge followed by the hidden filter: the "known" set.
pub fn reconcile(servers: Vec<Server>, config: &Config) -> Vec<Server> {
    filter_hidden(merge_labels(servers, &config.labels), &config.hidden)
}

/// The servers matching a live filter query; an empty query keeps all.
pub fn apply_filter(servers: &[Server], query: &str) -> Vec<Server> {
    servers
        .iter()
        .filter(|server| server.matches_filter(query))
        .cloned()
        .collect()
}

/// Clamp a cursor into `[0, len - 1]`, or 0 for an empty list.
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers(ports: &[u16]) -> Vec<Server> {
        ports.iter().map(|&port| Server::listening(port)).collect()
    }

    fn ports(servers: &[Server]) -> Vec<u16> {
        servers.iter().map(|s| s.port).collect()
    }

    #[test]
    fn test_merge_labels_applies_stored_labels() {
        let mut labels = BTreeMap::new();
        labels.insert(8080, "web".to_string());

        let merged = merge_labels(servers(&[8080, 3000]), &labels);
        assert_eq!(merged[0].label, "web");
        assert_eq!(merged[1].label, "");
    }

    #[test]
    fn test_merge_labels_is_idempotent() {
        let mut labels = BTreeMap::new();
        labels.insert(8080, "web".to_string());
        labels.insert(3000, "api".to_string());

        let once = merge_labels(servers(&[8080, 3000, 5432]), &labels);
        let twice = merge_labels(once.clone(), &labels);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_labels_overwrites() {
        let mut labels = BTreeMap::new();
        labels.insert(8080, "new".to_string());

        let merged = merge_labels(vec![Server::listening(8080).with_label("old")], &labels);
        assert_eq!(merged[0].label, "new");
    }

    #[test]
    fn test_filter_hidden_removes_exactly_hidden() {
        let kept = filter_hidden(servers(&[8080, 22, 3000, 443]), &[22, 443, 9999]);
        assert_eq!(ports(&kept), vec![8080, 3000]);
    }

    #[test]
    fn test_filter_hidden_none_hidden() {
        let kept = filter_hidden(servers(&[8080, 3000]), &[]);
        assert_eq!(ports(&kept), vec![8080, 3000]);
    }

    #[test]
    fn test_filter_hidden_keeps_labels() {
        let input = vec![Server::listening(8080).with_label("web"), Server::listening(22)];
        let kept = filter_hidden(input, &[22]);
        assert_eq!(kept[0].label, "web");
    }

    #[test]
    fn test_reconcile_end_to_end() {
        let mut config = Config::default();
        config.set_label(8080, "web-api");
        config.hide(22);

        let known = reconcile(servers(&[8080, 22, 3000]), &config);
        let visible = apply_filter(&known, "");

        assert_eq!(
            visible,
            vec![
                Server::listening(8080).with_label("web-api"),
                Server::listening(3000),
            ]
        );
    }

    #[test]
    fn test_apply_filter_matches_fields() {
        let known = vec![
            Server::with_owner(8080, 1, "node").with_label("frontend"),
            Server::with_owner(3000, 2, "Python"),
            Server::with_owner(5432, 3, "postgres").with_label("DB"),
        ];

        assert_eq!(ports(&apply_filter(&known, "")), vec![8080, 3000, 5432]);
        assert_eq!(ports(&apply_filter(&known, "80")), vec![8080]);
        assert_eq!(ports(&apply_filter(&known, "PYTHON")), vec![3000]);
        assert_eq!(ports(&apply_filter(&known, "db")), vec![5432]);
        assert_eq!(ports(&apply_filter(&known, "front")), vec![8080]);
        assert!(apply_filter(&known, "redis").is_empty());
    }

    #[test]
    fn test_clamp_cursor() {
        assert_eq!(clamp_cursor(0, 0), 0);
        assert_eq!(clamp_cursor(5, 0), 0);
        assert_eq!(clamp_cursor(5, 3), 2);
        assert_eq!(clamp_cursor(1, 3), 1);
    }
}
