// Target scorer: combines the latest snapshot with discovered peers and a
// known-versions table to rank candidate targets. Plain rule arithmetic over
// already-published data; no pipeline state of its own.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::{MissedTickBehavior, interval};

use crate::bus::Subscription;
use crate::config::ScoringConfig;
use crate::discovery::{NeighborDiscovery, Peer};
use crate::models::Snapshot;

const OUTDATED_SOFTWARE_POINTS: u32 = 20;
const CPU_HEADROOM_POINTS: u32 = 20;
const MEM_HEADROOM_POINTS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetScore {
    pub address: String,
    pub identifier: String,
    pub score: u32,
    pub outdated: Vec<String>,
}

pub struct TargetScorer {
    latest_versions: BTreeMap<String, String>,
    installed_versions: BTreeMap<String, String>,
    cpu_headroom_pct: f64,
    mem_headroom_pct: f64,
}

impl TargetScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            latest_versions: config.latest_versions.clone(),
            installed_versions: config.installed_versions.clone(),
            cpu_headroom_pct: config.cpu_headroom_pct,
            mem_headroom_pct: config.mem_headroom_pct,
        }
    }

    /// Score every peer against the latest snapshot. Peers scoring zero are
    /// dropped. Unavailable cpu/mem readings simply earn no headroom points;
    /// they are never treated as low usage.
    pub fn score(&self, snapshot: &Snapshot, peers: &[Peer]) -> Vec<TargetScore> {
        let outdated = self.outdated_software();
        let mut base: u32 = outdated.len() as u32 * OUTDATED_SOFTWARE_POINTS;
        if let Some(cpu) = snapshot.system.cpu_pct
            && cpu < self.cpu_headroom_pct
        {
            base += CPU_HEADROOM_POINTS;
        }
        if let Some(mem) = snapshot.system.mem_pct
            && mem < self.mem_headroom_pct
        {
            base += MEM_HEADROOM_POINTS;
        }
        peers
            .iter()
            .filter(|_| base > 0)
            .map(|peer| TargetScore {
                address: peer.address.clone(),
                identifier: peer.identifier.clone(),
                score: base,
                outdated: outdated.clone(),
            })
            .collect()
    }

    fn outdated_software(&self) -> Vec<String> {
        self.installed_versions
            .iter()
            .filter_map(|(name, version)| {
                let latest = self.latest_versions.get(name)?;
                if version.as_str() < latest.as_str() {
                    Some(format!("{}: {} (latest: {})", name, version, latest))
                } else {
                    None
                }
            })
            .collect()
    }
}

pub fn spawn(
    mut subscription: Subscription,
    discovery: Arc<NeighborDiscovery>,
    scorer: TargetScorer,
    scoring_interval_ms: u64,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(scoring_interval_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut latest_snapshot: Option<Arc<Snapshot>> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Some(update) = subscription.latest() {
                        latest_snapshot = Some(update.snapshot);
                    }
                    let Some(snapshot) = latest_snapshot.as_deref() else {
                        continue;
                    };
                    let peers = discovery.discover().await;
                    let targets = scorer.score(snapshot, &peers);
                    tracing::info!(
                        target: "hostwatch::scoring",
                        peers = peers.len(),
                        targets = targets.len(),
                        "scoring round"
                    );
                    for t in &targets {
                        tracing::info!(
                            target: "hostwatch::scoring",
                            address = %t.address,
                            identifier = %t.identifier,
                            score = t.score,
                            outdated = %t.outdated.join(", "),
                            "target"
                        );
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Scoring consumer shutting down");
                    break;
                }
            }
        }
    })
}
