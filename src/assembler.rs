// Merges per-source fragments into one immutable Snapshot and derives the
// cross-cycle deltas (byte rates, packet loss, disk throughput, filesystem
// changes) from the previous Snapshot.

use crate::models::{
    FilesystemMetrics, FsFragment, NetworkFragment, NetworkMetrics, Snapshot, SystemFragment,
    SystemMetrics,
};
use crate::sources::Fragment;

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("duplicate {kind} fragment in cycle")]
    DuplicateFragment { kind: &'static str },
}

/// Pure merge plus delta arithmetic. Missing fragments become unavailable
/// sections; a duplicate fragment is dropped (first one wins) and logged.
/// Cold start (no previous snapshot, or a non-advancing clock) leaves every
/// rate unavailable rather than reporting a fake zero.
pub fn assemble(
    fragments: Vec<Fragment>,
    previous: Option<&Snapshot>,
    timestamp_ms: u64,
) -> Snapshot {
    let mut system: Option<SystemFragment> = None;
    let mut network: Option<NetworkFragment> = None;
    let mut filesystem: Option<FsFragment> = None;
    for fragment in fragments {
        let kind = fragment.kind();
        let slot_taken = match fragment {
            Fragment::System(f) => replace_slot(&mut system, f),
            Fragment::Network(f) => replace_slot(&mut network, f),
            Fragment::Filesystem(f) => replace_slot(&mut filesystem, f),
        };
        if slot_taken {
            let err = AssemblyError::DuplicateFragment { kind };
            tracing::warn!(error = %err, fragment = kind, "dropping fragment");
        }
    }

    let elapsed = previous.and_then(|p| {
        if timestamp_ms > p.timestamp_ms {
            Some((timestamp_ms - p.timestamp_ms) as f64 / 1000.0)
        } else {
            None
        }
    });

    Snapshot {
        timestamp_ms,
        system: assemble_system(system, previous, elapsed),
        network: assemble_network(network, previous, elapsed),
        filesystem: assemble_filesystem(filesystem, previous),
    }
}

fn replace_slot<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        true
    } else {
        *slot = Some(value);
        false
    }
}

fn assemble_system(
    fragment: Option<SystemFragment>,
    previous: Option<&Snapshot>,
    elapsed: Option<f64>,
) -> SystemMetrics {
    let Some(f) = fragment else {
        return SystemMetrics::unavailable();
    };
    let prev = previous.map(|p| &p.system);
    SystemMetrics {
        cpu_pct: sanitize_pct(f.cpu_pct),
        mem_pct: sanitize_pct(f.mem_pct),
        disk_pct: sanitize_pct(f.disk_pct),
        load_avg: f.load_avg.filter(|l| l.iter().all(|v| v.is_finite() && *v >= 0.0)),
        core_count: f.core_count,
        uptime_secs: f.uptime_secs,
        process_count: f.process_count,
        processes: f.processes,
        battery_pct: sanitize_pct(f.battery_pct),
        temperature_c: f.temperature_c.filter(|t| t.is_finite()),
        disk_read_bytes_per_sec: counter_rate(
            f.disk_read_bytes_total,
            prev.and_then(|p| p.disk_read_bytes_total),
            elapsed,
        ),
        disk_write_bytes_per_sec: counter_rate(
            f.disk_write_bytes_total,
            prev.and_then(|p| p.disk_write_bytes_total),
            elapsed,
        ),
        disk_read_bytes_total: f.disk_read_bytes_total,
        disk_write_bytes_total: f.disk_write_bytes_total,
    }
}

fn assemble_network(
    fragment: Option<NetworkFragment>,
    previous: Option<&Snapshot>,
    elapsed: Option<f64>,
) -> NetworkMetrics {
    let Some(f) = fragment else {
        return NetworkMetrics::unavailable();
    };
    let prev = previous.map(|p| &p.network);
    let packet_loss_pct = packet_loss(
        f.packets_total,
        prev.and_then(|p| p.packets_total),
        f.errors_total,
        prev.and_then(|p| p.errors_total),
    );
    NetworkMetrics {
        bytes_sent_per_sec: counter_rate(
            f.bytes_sent_total,
            prev.and_then(|p| p.bytes_sent_total),
            elapsed,
        ),
        bytes_recv_per_sec: counter_rate(
            f.bytes_recv_total,
            prev.and_then(|p| p.bytes_recv_total),
            elapsed,
        ),
        packet_loss_pct,
        latency_ms: f.latency_ms.filter(|v| v.is_finite() && *v >= 0.0),
        dns_ms: f.dns_ms.filter(|v| v.is_finite() && *v >= 0.0),
        open_ports: f.open_ports,
        connections: f.connections,
        interfaces: f.interfaces,
        bytes_sent_total: f.bytes_sent_total,
        bytes_recv_total: f.bytes_recv_total,
        packets_total: f.packets_total,
        errors_total: f.errors_total,
    }
}

fn assemble_filesystem(
    fragment: Option<FsFragment>,
    previous: Option<&Snapshot>,
) -> FilesystemMetrics {
    let previous_tracked = previous.map(|p| &p.filesystem.tracked);
    let Some(f) = fragment else {
        // Carry the last observed map forward so a one-cycle outage does not
        // flag every path as newly appeared on recovery.
        return FilesystemMetrics::unavailable(previous_tracked.cloned().unwrap_or_default());
    };
    let changed_paths = match previous_tracked {
        Some(prev) => f
            .mtimes
            .iter()
            .filter(|(path, mtime)| prev.get(*path) != Some(*mtime))
            .map(|(path, _)| path.clone())
            .collect(),
        // Cold start: nothing to compare against.
        None => Vec::new(),
    };
    FilesystemMetrics {
        available: true,
        changed_paths,
        tracked: f.mtimes,
    }
}

/// Rate of a monotonic counter. A counter that went backwards was reset, so
/// the delta is the current value rather than a negative number.
fn counter_rate(current: Option<u64>, previous: Option<u64>, elapsed: Option<f64>) -> Option<f64> {
    let current = current?;
    let previous = previous?;
    let elapsed = elapsed.filter(|e| *e > 0.0)?;
    let delta = if current < previous {
        current
    } else {
        current - previous
    };
    Some(delta as f64 / elapsed)
}

/// 100 * error_delta / packet_delta, or 0 when no packets moved. Deltas use
/// the same reset rule as rates.
fn packet_loss(
    packets: Option<u64>,
    prev_packets: Option<u64>,
    errors: Option<u64>,
    prev_errors: Option<u64>,
) -> Option<f64> {
    let packet_delta = counter_delta(packets?, prev_packets?);
    let error_delta = counter_delta(errors?, prev_errors?);
    if packet_delta == 0 {
        return Some(0.0);
    }
    Some((error_delta as f64 / packet_delta as f64) * 100.0)
}

fn counter_delta(current: u64, previous: u64) -> u64 {
    if current < previous {
        current
    } else {
        current - previous
    }
}

fn sanitize_pct(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.min(100.0))
}
