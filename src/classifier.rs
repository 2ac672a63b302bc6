// Pure rule-based classification of a Snapshot into qualitative states.
// Ordered evaluation per category, most specific rule first. A category
// whose inputs are unavailable comes out Unknown; unavailable values are
// never coerced to a number that could trip a rule.

use crate::config::Thresholds;
use crate::models::{
    Bottleneck, DerivedState, NetworkMetrics, NetworkTraffic, SecurityState, Snapshot, SystemLoad,
    SystemMetrics, Trend,
};

/// Deterministic and side-effect-free: the same (current, previous) pair
/// always yields the same DerivedState.
pub fn classify(
    current: &Snapshot,
    previous: Option<&Snapshot>,
    thresholds: &Thresholds,
) -> DerivedState {
    let prev_system = previous.map(|p| &p.system);
    DerivedState {
        timestamp_ms: current.timestamp_ms,
        system_load: system_load(&current.system, thresholds),
        cpu_trend: trend(
            current.system.cpu_pct,
            prev_system.and_then(|p| p.cpu_pct),
            previous.is_some(),
            thresholds,
        ),
        memory_trend: trend(
            current.system.mem_pct,
            prev_system.and_then(|p| p.mem_pct),
            previous.is_some(),
            thresholds,
        ),
        network_traffic: network_traffic(&current.network, thresholds),
        bottleneck: bottleneck(&current.system, thresholds),
        security: security(current, thresholds),
    }
}

fn system_load(system: &SystemMetrics, th: &Thresholds) -> SystemLoad {
    let (Some(cpu), Some(mem)) = (system.cpu_pct, system.mem_pct) else {
        return SystemLoad::Unknown;
    };
    // heavy_load needs the load average too; without it the combined rule
    // cannot fire but the single-metric rules still apply.
    if let (Some(load), Some(cores)) = (system.load_avg, system.core_count)
        && cpu > th.cpu_high_pct
        && mem > th.mem_high_pct
        && load[0] > cores as f64
    {
        return SystemLoad::HeavyLoad;
    }
    if cpu > th.cpu_high_pct || mem > th.mem_high_pct {
        SystemLoad::Stressed
    } else if cpu < th.idle_pct && mem < th.idle_pct {
        SystemLoad::Idle
    } else {
        SystemLoad::Balanced
    }
}

fn trend(current: Option<f64>, previous: Option<f64>, has_previous: bool, th: &Thresholds) -> Trend {
    if !has_previous {
        return Trend::Unknown;
    }
    let (Some(curr), Some(prev)) = (current, previous) else {
        return Trend::Unknown;
    };
    let delta = curr - prev;
    if delta > th.trend_delta_pp {
        Trend::Spiking
    } else if delta < -th.trend_delta_pp {
        Trend::Dropping
    } else {
        Trend::Stable
    }
}

/// Exactly one of cpu/mem/disk high while the other two are low.
fn bottleneck(system: &SystemMetrics, th: &Thresholds) -> Bottleneck {
    let (Some(cpu), Some(mem), Some(disk)) = (system.cpu_pct, system.mem_pct, system.disk_pct)
    else {
        return Bottleneck::Unknown;
    };
    let high = th.cpu_high_pct;
    let low = th.resource_low_pct;
    if cpu > high && mem < low && disk < low {
        Bottleneck::CpuLimited
    } else if mem > high && cpu < low && disk < low {
        Bottleneck::MemoryLimited
    } else if disk > high && cpu < low && mem < low {
        Bottleneck::DiskLimited
    } else {
        Bottleneck::None
    }
}

fn network_traffic(network: &NetworkMetrics, th: &Thresholds) -> NetworkTraffic {
    // Congestion first: either signal alone is enough.
    if let Some(loss) = network.packet_loss_pct
        && loss > th.packet_loss_pct
    {
        return NetworkTraffic::Congested;
    }
    if let Some(latency) = network.latency_ms
        && latency > th.latency_ms
    {
        return NetworkTraffic::Congested;
    }
    let (Some(sent), Some(recv)) = (network.bytes_sent_per_sec, network.bytes_recv_per_sec) else {
        return NetworkTraffic::Unknown;
    };
    if sent > th.traffic_floor_bytes_per_sec && sent > recv * th.traffic_ratio {
        NetworkTraffic::UploadHeavy
    } else if recv > th.traffic_floor_bytes_per_sec && recv > sent * th.traffic_ratio {
        NetworkTraffic::DownloadHeavy
    } else {
        NetworkTraffic::Normal
    }
}

fn security(current: &Snapshot, th: &Thresholds) -> SecurityState {
    if !current.filesystem.available {
        return SecurityState::Unknown;
    }
    if current.filesystem.changed_paths.is_empty() {
        return SecurityState::Secure;
    }
    // Changes detected; whether they escalate depends on the peer count,
    // which must itself be available to decide either way.
    match current.network.unique_remote_peers() {
        Some(peers) if peers > th.suspicious_peer_count => SecurityState::SuspiciousActivity,
        Some(_) => SecurityState::FileModifications,
        None => SecurityState::Unknown,
    }
}
