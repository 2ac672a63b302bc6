// Host resource metrics. Every gauge is Option: None means the reading was
// unavailable this cycle, which is distinct from a legitimate zero.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStat {
    pub pid: u32,
    pub name: String,
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub memory_bytes: u64,
}

/// Raw output of one SystemSource sample: gauges plus cumulative counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemFragment {
    pub cpu_pct: Option<f64>,
    pub mem_pct: Option<f64>,
    pub disk_pct: Option<f64>,
    pub load_avg: Option<[f64; 3]>,
    pub core_count: Option<u32>,
    pub uptime_secs: Option<u64>,
    pub process_count: Option<u32>,
    pub processes: Vec<ProcessStat>,
    pub battery_pct: Option<f64>,
    pub temperature_c: Option<f64>,
    pub disk_read_bytes_total: Option<u64>,
    pub disk_write_bytes_total: Option<u64>,
}

/// System section of a Snapshot: the fragment's gauges plus disk throughput
/// derived against the previous cycle. Cumulative counters are carried so the
/// next cycle can compute its deltas from the previous Snapshot alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub cpu_pct: Option<f64>,
    pub mem_pct: Option<f64>,
    pub disk_pct: Option<f64>,
    pub load_avg: Option<[f64; 3]>,
    pub core_count: Option<u32>,
    pub uptime_secs: Option<u64>,
    pub process_count: Option<u32>,
    pub processes: Vec<ProcessStat>,
    pub battery_pct: Option<f64>,
    pub temperature_c: Option<f64>,
    pub disk_read_bytes_total: Option<u64>,
    pub disk_write_bytes_total: Option<u64>,
    pub disk_read_bytes_per_sec: Option<f64>,
    pub disk_write_bytes_per_sec: Option<f64>,
}

impl SystemMetrics {
    /// All fields unavailable; used when the source produced no fragment.
    pub fn unavailable() -> Self {
        Self {
            cpu_pct: None,
            mem_pct: None,
            disk_pct: None,
            load_avg: None,
            core_count: None,
            uptime_secs: None,
            process_count: None,
            processes: Vec::new(),
            battery_pct: None,
            temperature_c: None,
            disk_read_bytes_total: None,
            disk_write_bytes_total: None,
            disk_read_bytes_per_sec: None,
            disk_write_bytes_per_sec: None,
        }
    }
}
