// Dashboard consumer: renders the latest snapshot and derived state through
// the log at its own refresh cadence, keeping a short ring of recent states
// for trend context. Unavailable readings render as "n/a", never as 0.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{MissedTickBehavior, interval};

use crate::bus::Subscription;
use crate::models::DerivedState;

pub struct DashboardConfig {
    pub refresh_ms: u64,
    /// Recent derived states retained for trend display.
    pub state_history: usize,
    pub top_processes: usize,
}

/// Fixed-size ring of the most recent derived states.
struct StateRing {
    buf: VecDeque<Arc<DerivedState>>,
    cap: usize,
}

impl StateRing {
    fn new(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap),
            cap: cap.max(1),
        }
    }

    fn push(&mut self, state: Arc<DerivedState>) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(state);
    }

    /// How many of the retained states carry a stressed or heavy load label.
    fn stressed_count(&self) -> usize {
        use crate::models::SystemLoad::{HeavyLoad, Stressed};
        self.buf
            .iter()
            .filter(|s| matches!(s.system_load, Stressed | HeavyLoad))
            .count()
    }
}

pub fn spawn(
    mut subscription: Subscription,
    config: DashboardConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(config.refresh_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ring = StateRing::new(config.state_history);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let Some(update) = subscription.latest() else {
                        continue;
                    };
                    ring.push(update.state.clone());
                    let state = &update.state;
                    let system = &update.snapshot.system;
                    let network = &update.snapshot.network;
                    tracing::info!(
                        target: "hostwatch::dashboard",
                        system_load = %state.system_load,
                        cpu_trend = %state.cpu_trend,
                        memory_trend = %state.memory_trend,
                        network_traffic = %state.network_traffic,
                        bottleneck = %state.bottleneck,
                        security = %state.security,
                        cpu = %fmt_pct(system.cpu_pct),
                        mem = %fmt_pct(system.mem_pct),
                        disk = %fmt_pct(system.disk_pct),
                        latency_ms = %fmt_num(network.latency_ms),
                        sent_per_sec = %fmt_num(network.bytes_sent_per_sec),
                        recv_per_sec = %fmt_num(network.bytes_recv_per_sec),
                        stressed_recently = ring.stressed_count(),
                        "dashboard"
                    );
                    for p in update.snapshot.system.processes.iter().take(config.top_processes) {
                        tracing::debug!(
                            target: "hostwatch::dashboard",
                            pid = p.pid,
                            name = %p.name,
                            cpu = %format!("{:.1}%", p.cpu_pct),
                            mem = %format!("{:.1}%", p.mem_pct),
                            "top process"
                        );
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Dashboard consumer shutting down");
                    break;
                }
            }
        }
    })
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".into(),
    }
}

fn fmt_num(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "n/a".into(),
    }
}
