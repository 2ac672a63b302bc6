// Host resource sampling via sysinfo, refreshed under spawn_blocking.

use std::sync::{Arc, Mutex};

use sysinfo::{Components, Disks, ProcessesToUpdate, System};

use super::{Fragment, MetricSource, SourceError, linux};
use crate::models::{ProcessStat, SystemFragment};

pub struct SystemSource {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    components: Arc<Mutex<Components>>,
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSource {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let components = Components::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            components: Arc::new(Mutex::new(components)),
        }
    }
}

impl MetricSource for SystemSource {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn sample(&self) -> Result<Fragment, SourceError> {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let components = self.components.clone();
        let fragment = tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| SourceError::Transient(format!("sysinfo lock poisoned: {}", e)))?;

            sys.refresh_cpu_all();
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);

            let cpu_pct = Some((sys.global_cpu_usage() as f64).clamp(0.0, 100.0));
            let total_mem = sys.total_memory();
            let mem_pct = if total_mem > 0 {
                let used = total_mem.saturating_sub(sys.available_memory());
                Some((used as f64 / total_mem as f64) * 100.0)
            } else {
                None
            };

            let load = System::load_average();
            let load_avg = Some([load.one, load.five, load.fifteen]);
            let core_count = Some(sys.cpus().len() as u32);
            let uptime_secs = Some(System::uptime());

            let mut processes: Vec<ProcessStat> = sys
                .processes()
                .iter()
                .map(|(pid, p)| ProcessStat {
                    pid: pid.as_u32(),
                    name: p.name().to_string_lossy().into_owned(),
                    cpu_pct: p.cpu_usage() as f64,
                    mem_pct: if total_mem > 0 {
                        (p.memory() as f64 / total_mem as f64) * 100.0
                    } else {
                        0.0
                    },
                    memory_bytes: p.memory(),
                })
                .collect();
            processes.sort_by(|a, b| b.cpu_pct.total_cmp(&a.cpu_pct));
            let process_count = Some(processes.len() as u32);

            // Disk usage of the root filesystem plus cumulative I/O counters
            // across devices. Disk stats failing leaves the rest intact.
            let (disk_pct, disk_read_bytes_total, disk_write_bytes_total) = match disks.lock() {
                Ok(mut disks_guard) => {
                    disks_guard.refresh(false);
                    let root = disks_guard
                        .list()
                        .iter()
                        .find(|d| d.mount_point() == std::path::Path::new("/"))
                        .or_else(|| disks_guard.list().first());
                    let disk_pct = root.and_then(|d| {
                        let total = d.total_space();
                        if total == 0 {
                            return None;
                        }
                        let used = total.saturating_sub(d.available_space());
                        Some((used as f64 / total as f64) * 100.0)
                    });
                    let mut read_total: u64 = 0;
                    let mut write_total: u64 = 0;
                    for d in disks_guard.list() {
                        let usage = d.usage();
                        read_total = read_total.saturating_add(usage.total_read_bytes);
                        write_total = write_total.saturating_add(usage.total_written_bytes);
                    }
                    (disk_pct, Some(read_total), Some(write_total))
                }
                Err(e) => {
                    tracing::warn!(error = %e, operation = "sample_disks", "disk stats unavailable");
                    (None, None, None)
                }
            };

            let temperature_c = match components.lock() {
                Ok(mut guard) => {
                    guard.refresh(false);
                    let list = guard.list();
                    list.iter()
                        .find(|c| {
                            let label = c.label().to_ascii_lowercase();
                            label.contains("coretemp") || label.contains("cpu")
                        })
                        .or_else(|| list.first())
                        .and_then(|c| c.temperature())
                        .map(f64::from)
                }
                Err(_) => None,
            };

            Ok(SystemFragment {
                cpu_pct,
                mem_pct,
                disk_pct,
                load_avg,
                core_count,
                uptime_secs,
                process_count,
                processes,
                battery_pct: linux::read_battery_pct(),
                temperature_c,
                disk_read_bytes_total,
                disk_write_bytes_total,
            })
        })
        .await
        .map_err(|e| SourceError::Transient(format!("sysinfo task join: {}", e)))??;

        Ok(Fragment::System(fragment))
    }
}
