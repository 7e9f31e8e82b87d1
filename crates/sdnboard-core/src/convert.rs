// ── API-to-record conversions ──
//
// Bridges raw `sdnboard_api` response types into panel records. The two
// map-shaped endpoints (`/ports`, `/thresholds`) are flattened into rows
// ordered by datapath id, then by port.

use chrono::{DateTime, Utc};

use sdnboard_api::models::{self as wire, PortInventory, ThresholdTable};

use crate::model::{
    BlockedHost, ConnectedHost, HostAddress, HostAttachment, PortThreshold, ServicePort,
    SwitchPort,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an ISO-8601 timestamp, dropping values the controller mangled.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Hosts ──────────────────────────────────────────────────────────

impl From<wire::ConnectedIp> for ConnectedHost {
    fn from(raw: wire::ConnectedIp) -> Self {
        Self {
            last_seen: parse_datetime(raw.last_seen.as_deref()),
            ip: raw.ip,
            hostname: raw.hostname,
        }
    }
}

impl From<wire::BlockedIp> for BlockedHost {
    fn from(raw: wire::BlockedIp) -> Self {
        Self {
            blocked_at: parse_datetime(raw.blocked_at.as_deref()),
            ip: raw.ip,
            reason: raw.reason,
        }
    }
}

impl From<String> for HostAddress {
    fn from(ip: String) -> Self {
        Self(ip)
    }
}

impl From<wire::HostAttachment> for HostAttachment {
    fn from(raw: wire::HostAttachment) -> Self {
        Self {
            ip: raw.ip,
            switch: raw.switch,
            port: raw.port,
        }
    }
}

// ── Ports ──────────────────────────────────────────────────────────

impl From<wire::ServicePort> for ServicePort {
    fn from(raw: wire::ServicePort) -> Self {
        Self {
            port: raw.port,
            service: raw.service,
            protocol: raw.protocol,
            blocked: raw.blocked,
        }
    }
}

/// Flatten the per-switch `/ports` map. A port is blocked when its number
/// appears in that switch's `blocked_ports` list.
pub fn flatten_switch_ports(inventory: PortInventory) -> Vec<SwitchPort> {
    let mut rows = Vec::new();
    for (dpid, switch) in inventory {
        let mut ports = switch.all_ports;
        ports.sort_by_key(|p| p.port_no);
        for desc in ports {
            rows.push(SwitchPort {
                dpid,
                blocked: switch.blocked_ports.contains(&desc.port_no),
                port_no: desc.port_no,
                name: desc.name,
                hw_addr: desc.hw_addr,
            });
        }
    }
    rows
}

// ── Thresholds ─────────────────────────────────────────────────────

/// Flatten the per-switch `/thresholds` map, keeping the controller's
/// port order within each switch.
pub fn flatten_thresholds(table: ThresholdTable) -> Vec<PortThreshold> {
    table
        .into_iter()
        .flat_map(|(dpid, entries)| {
            entries.into_iter().map(move |e| PortThreshold {
                dpid,
                port: e.port,
                threshold: e.threshold,
                max_threshold: e.max_threshold,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use sdnboard_api::Dpid;

    #[test]
    fn switch_ports_flag_blocked_membership() {
        let inventory: PortInventory = serde_json::from_value(json!({
            "2": {"all_ports": [{"port_no": 1, "name": "s2-eth1", "hw_addr": "aa"}], "blocked_ports": []},
            "1": {
                "all_ports": [
                    {"port_no": 2, "name": "s1-eth2", "hw_addr": "bb"},
                    {"port_no": 1, "name": "s1-eth1", "hw_addr": "cc"}
                ],
                "blocked_ports": [2]
            }
        }))
        .unwrap();

        let rows = flatten_switch_ports(inventory);
        let summary: Vec<(u64, u32, bool)> = rows
            .iter()
            .map(|r| (r.dpid.get(), r.port_no, r.blocked))
            .collect();
        assert_eq!(summary, vec![(1, 1, false), (1, 2, true), (2, 1, false)]);
    }

    #[test]
    fn thresholds_flatten_in_dpid_order() {
        let table: ThresholdTable = serde_json::from_value(json!({
            "3": [{"port": 1, "threshold": 10.0, "max_threshold": 100.0}],
            "1": [{"port": 4, "threshold": 2.5}, {"port": 2, "threshold": 7.0}]
        }))
        .unwrap();

        let rows = flatten_thresholds(table);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].dpid, Dpid(1));
        assert_eq!(rows[0].port, 4);
        assert_eq!(rows[2].max_threshold, Some(100.0));
    }

    #[test]
    fn bad_timestamps_become_none() {
        let host: ConnectedHost = wire::ConnectedIp {
            ip: "10.0.0.1".into(),
            hostname: "h1".into(),
            last_seen: Some("yesterday".into()),
        }
        .into();
        assert_eq!(host.last_seen, None);

        let host: ConnectedHost = wire::ConnectedIp {
            ip: "10.0.0.1".into(),
            hostname: "h1".into(),
            last_seen: Some("2024-06-15T10:30:00Z".into()),
        }
        .into();
        assert!(host.last_seen.is_some());
    }
}
