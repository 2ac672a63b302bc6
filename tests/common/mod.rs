// Shared builders for snapshot-based tests.

use std::collections::BTreeMap;

use hostwatch::assembler::assemble;
use hostwatch::models::*;
use hostwatch::sources::Fragment;

pub fn sys_frag(cpu: Option<f64>, mem: Option<f64>, disk: Option<f64>) -> SystemFragment {
    SystemFragment {
        cpu_pct: cpu,
        mem_pct: mem,
        disk_pct: disk,
        load_avg: Some([1.0, 1.0, 1.0]),
        core_count: Some(4),
        uptime_secs: Some(3600),
        process_count: Some(42),
        processes: vec![],
        battery_pct: None,
        temperature_c: None,
        disk_read_bytes_total: Some(0),
        disk_write_bytes_total: Some(0),
    }
}

pub fn net_frag(bytes_sent: u64, bytes_recv: u64) -> NetworkFragment {
    NetworkFragment {
        bytes_sent_total: Some(bytes_sent),
        bytes_recv_total: Some(bytes_recv),
        packets_total: Some(0),
        errors_total: Some(0),
        latency_ms: Some(10.0),
        dns_ms: Some(5.0),
        open_ports: Some(vec![]),
        connections: Some(vec![]),
        interfaces: Some(vec![]),
    }
}

pub fn fs_frag(mtimes: &[(&str, u64)]) -> FsFragment {
    FsFragment {
        mtimes: mtimes
            .iter()
            .map(|(path, mtime)| (path.to_string(), *mtime))
            .collect::<BTreeMap<String, u64>>(),
    }
}

pub fn connection(remote: &str) -> ConnectionStat {
    ConnectionStat {
        local_addr: "10.0.0.2:50000".into(),
        remote_addr: Some(remote.into()),
        state: "established".into(),
    }
}

/// A snapshot with the given system gauges and everything else unavailable.
pub fn system_snapshot(ts: u64, cpu: Option<f64>, mem: Option<f64>, disk: Option<f64>) -> Snapshot {
    assemble(
        vec![Fragment::System(sys_frag(cpu, mem, disk))],
        None,
        ts,
    )
}
