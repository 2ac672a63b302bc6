use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub monitoring: MonitoringConfig,
    pub retry: RetryConfig,
    pub bus: BusConfig,
    pub probes: ProbeConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub consumers: ConsumersConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Telemetry cycle period: one snapshot is produced per interval.
    pub cycle_interval_ms: u64,
    /// Per-source deadline within a cycle; a source that misses it contributes
    /// an unavailable fragment instead of delaying the pipeline.
    pub source_deadline_ms: u64,
    /// How often to log app stats (cycles, subscribers) at INFO level.
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Per-subscriber buffer capacity; a slow subscriber loses the oldest
    /// unread updates, never more than this many are retained for it.
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// TCP endpoint for the latency probe, e.g. "8.8.8.8:53".
    pub latency_target: String,
    /// Hostname for the DNS resolution probe.
    pub dns_probe_host: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchConfig {
    /// Directories whose entries are tracked for mtime changes.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Classification thresholds. All tunable; defaults match the shipped rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub cpu_high_pct: f64,
    pub mem_high_pct: f64,
    pub idle_pct: f64,
    /// Percentage-point delta against the previous cycle that counts as a
    /// spike or a drop.
    pub trend_delta_pp: f64,
    /// Below this a resource counts as "low" for bottleneck detection.
    pub resource_low_pct: f64,
    pub packet_loss_pct: f64,
    pub latency_ms: f64,
    /// One direction must exceed the other by this factor to count as
    /// upload- or download-heavy.
    pub traffic_ratio: f64,
    /// Minimum rate (bytes/s) before traffic direction is classified at all.
    pub traffic_floor_bytes_per_sec: f64,
    /// Unique remote peers above which file changes escalate to
    /// suspicious_activity.
    pub suspicious_peer_count: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_high_pct: 80.0,
            mem_high_pct: 80.0,
            idle_pct: 20.0,
            trend_delta_pp: 20.0,
            resource_low_pct: 40.0,
            packet_loss_pct: 5.0,
            latency_ms: 100.0,
            traffic_ratio: 2.0,
            traffic_floor_bytes_per_sec: 1024.0 * 1024.0,
            suspicious_peer_count: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsumersConfig {
    pub dashboard_refresh_ms: u64,
    /// Ring of recent derived states kept by the dashboard for trend display.
    pub state_history: usize,
    pub top_processes: usize,
    pub scoring_interval_ms: u64,
}

impl Default for ConsumersConfig {
    fn default() -> Self {
        Self {
            dashboard_refresh_ms: 1000,
            state_history: 12,
            top_processes: 5,
            scoring_interval_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// name -> newest known version; peers running older versions score higher.
    pub latest_versions: BTreeMap<String, String>,
    /// name -> version observed on this host, supplied externally.
    pub installed_versions: BTreeMap<String, String>,
    pub cpu_headroom_pct: f64,
    pub mem_headroom_pct: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            latest_versions: BTreeMap::new(),
            installed_versions: BTreeMap::new(),
            cpu_headroom_pct: 70.0,
            mem_headroom_pct: 80.0,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.monitoring.cycle_interval_ms > 0,
            "monitoring.cycle_interval_ms must be > 0, got {}",
            self.monitoring.cycle_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.source_deadline_ms > 0,
            "monitoring.source_deadline_ms must be > 0, got {}",
            self.monitoring.source_deadline_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.retry.max_attempts > 0,
            "retry.max_attempts must be > 0, got {}",
            self.retry.max_attempts
        );
        anyhow::ensure!(
            self.retry.min_delay_ms <= self.retry.max_delay_ms,
            "retry.min_delay_ms ({}) must be <= retry.max_delay_ms ({})",
            self.retry.min_delay_ms,
            self.retry.max_delay_ms
        );
        anyhow::ensure!(self.bus.capacity > 0, "bus.capacity must be > 0");
        anyhow::ensure!(
            !self.probes.latency_target.is_empty(),
            "probes.latency_target must be non-empty"
        );
        anyhow::ensure!(
            !self.probes.dns_probe_host.is_empty(),
            "probes.dns_probe_host must be non-empty"
        );
        anyhow::ensure!(
            self.probes.timeout_ms > 0,
            "probes.timeout_ms must be > 0, got {}",
            self.probes.timeout_ms
        );
        anyhow::ensure!(
            self.thresholds.idle_pct < self.thresholds.cpu_high_pct,
            "thresholds.idle_pct ({}) must be < thresholds.cpu_high_pct ({})",
            self.thresholds.idle_pct,
            self.thresholds.cpu_high_pct
        );
        anyhow::ensure!(
            self.thresholds.resource_low_pct < self.thresholds.cpu_high_pct,
            "thresholds.resource_low_pct ({}) must be < thresholds.cpu_high_pct ({})",
            self.thresholds.resource_low_pct,
            self.thresholds.cpu_high_pct
        );
        anyhow::ensure!(
            self.thresholds.trend_delta_pp > 0.0,
            "thresholds.trend_delta_pp must be > 0"
        );
        anyhow::ensure!(
            self.thresholds.traffic_ratio >= 1.0,
            "thresholds.traffic_ratio must be >= 1.0, got {}",
            self.thresholds.traffic_ratio
        );
        anyhow::ensure!(
            self.consumers.dashboard_refresh_ms > 0,
            "consumers.dashboard_refresh_ms must be > 0"
        );
        anyhow::ensure!(
            self.consumers.state_history > 0,
            "consumers.state_history must be > 0"
        );
        anyhow::ensure!(
            self.consumers.scoring_interval_ms > 0,
            "consumers.scoring_interval_ms must be > 0"
        );
        Ok(())
    }
}
