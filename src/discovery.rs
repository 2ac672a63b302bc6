// Neighbor discovery from the kernel ARP cache. External to the telemetry
// pipeline; only the target scorer consumes its output. The cache read goes
// through the retry policy since /proc reads can race with table updates.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

const ARP_TABLE_PATH: &str = "/proc/net/arp";

/// A discovered network peer: address plus hardware identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub address: String,
    pub identifier: String,
}

pub struct NeighborDiscovery {
    retry: RetryPolicy,
    table_path: PathBuf,
    unsupported: AtomicBool,
}

impl NeighborDiscovery {
    pub fn new(retry: RetryPolicy) -> Self {
        Self::with_table_path(retry, ARP_TABLE_PATH.into())
    }

    pub fn with_table_path(retry: RetryPolicy, table_path: PathBuf) -> Self {
        Self {
            retry,
            table_path,
            unsupported: AtomicBool::new(false),
        }
    }

    /// Current neighbors, or empty when discovery is unavailable. Exhausted
    /// retries degrade to "no peers this round", never to an error.
    pub async fn discover(&self) -> Vec<Peer> {
        if self.unsupported.load(Ordering::Relaxed) {
            return Vec::new();
        }
        if !self.table_path.exists() {
            tracing::warn!(
                path = %self.table_path.display(),
                "neighbor table missing on this host; discovery disabled"
            );
            self.unsupported.store(true, Ordering::Relaxed);
            return Vec::new();
        }
        let path = self.table_path.clone();
        let result = self
            .retry
            .execute("neighbor_discovery", || {
                let path = path.clone();
                async move { tokio::fs::read_to_string(&path).await }
            })
            .await;
        match result {
            Ok(content) => {
                let peers = parse_arp_table(&content);
                tracing::debug!(operation = "discover", peers = peers.len(), "neighbor scan done");
                peers
            }
            Err(e) => {
                tracing::warn!(error = %e, "neighbor discovery unavailable this round");
                Vec::new()
            }
        }
    }
}

/// Parse the /proc/net/arp table: complete entries only, one peer per
/// distinct address.
pub fn parse_arp_table(content: &str) -> Vec<Peer> {
    let mut peers: Vec<Peer> = Vec::new();
    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }
        let (address, flags, identifier) = (fields[0], fields[2], fields[3]);
        // 0x0 flags mark an incomplete entry.
        if flags == "0x0" || identifier == "00:00:00:00:00:00" {
            continue;
        }
        if peers.iter().any(|p| p.address == address) {
            continue;
        }
        peers.push(Peer {
            address: address.to_string(),
            identifier: identifier.to_string(),
        });
    }
    peers
}
