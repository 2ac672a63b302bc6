// Network metrics: interface counters, probes, socket tables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceStat {
    pub name: String,
    pub is_up: Option<bool>,
    pub bytes_sent_total: u64,
    pub bytes_recv_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStat {
    pub local_addr: String,
    pub remote_addr: Option<String>,
    pub state: String,
}

/// Raw output of one NetworkSource sample. Each field is independently
/// Option so a failed probe leaves the rest of the fragment intact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkFragment {
    pub bytes_sent_total: Option<u64>,
    pub bytes_recv_total: Option<u64>,
    /// Packets sent + received, combined across interfaces.
    pub packets_total: Option<u64>,
    /// Errors in + out, combined across interfaces.
    pub errors_total: Option<u64>,
    pub latency_ms: Option<f64>,
    pub dns_ms: Option<f64>,
    pub open_ports: Option<Vec<u16>>,
    pub connections: Option<Vec<ConnectionStat>>,
    pub interfaces: Option<Vec<InterfaceStat>>,
}

/// Network section of a Snapshot. Cumulative counters ride along so the next
/// cycle's rates derive from the previous Snapshot alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub bytes_sent_total: Option<u64>,
    pub bytes_recv_total: Option<u64>,
    pub packets_total: Option<u64>,
    pub errors_total: Option<u64>,
    pub bytes_sent_per_sec: Option<f64>,
    pub bytes_recv_per_sec: Option<f64>,
    pub packet_loss_pct: Option<f64>,
    pub latency_ms: Option<f64>,
    pub dns_ms: Option<f64>,
    pub open_ports: Option<Vec<u16>>,
    pub connections: Option<Vec<ConnectionStat>>,
    pub interfaces: Option<Vec<InterfaceStat>>,
}

impl NetworkMetrics {
    pub fn unavailable() -> Self {
        Self {
            bytes_sent_total: None,
            bytes_recv_total: None,
            packets_total: None,
            errors_total: None,
            bytes_sent_per_sec: None,
            bytes_recv_per_sec: None,
            packet_loss_pct: None,
            latency_ms: None,
            dns_ms: None,
            open_ports: None,
            connections: None,
            interfaces: None,
        }
    }

    /// Distinct remote addresses among established connections, or None when
    /// the connection table was unavailable this cycle.
    pub fn unique_remote_peers(&self) -> Option<usize> {
        let connections = self.connections.as_ref()?;
        let peers: BTreeSet<&str> = connections
            .iter()
            .filter_map(|c| c.remote_addr.as_deref())
            .filter_map(|addr| addr.rsplit_once(':').map(|(host, _)| host))
            .collect();
        Some(peers.len())
    }
}
