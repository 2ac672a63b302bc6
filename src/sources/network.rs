// Network sampling: interface counters via sysinfo, socket tables from
// /proc/net/tcp, and latency/DNS probes under a fixed timeout. Probes that
// fail or time out yield unavailable fields, never a hung or failed sample.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sysinfo::Networks;
use tokio::time::{Instant, timeout};

use super::{Fragment, MetricSource, SourceError, linux, proc_net};
use crate::config::ProbeConfig;
use crate::models::{InterfaceStat, NetworkFragment};

pub struct NetworkSource {
    networks: Arc<Mutex<Networks>>,
    latency_target: String,
    dns_probe_host: String,
    probe_timeout: Duration,
}

impl NetworkSource {
    pub fn new(probes: &ProbeConfig) -> Self {
        Self {
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            latency_target: probes.latency_target.clone(),
            dns_probe_host: probes.dns_probe_host.clone(),
            probe_timeout: Duration::from_millis(probes.timeout_ms),
        }
    }

    /// TCP connect round-trip to the configured target, in milliseconds.
    async fn probe_latency(&self) -> Option<f64> {
        let start = Instant::now();
        match timeout(
            self.probe_timeout,
            tokio::net::TcpStream::connect(&self.latency_target),
        )
        .await
        {
            Ok(Ok(_stream)) => Some(start.elapsed().as_secs_f64() * 1000.0),
            Ok(Err(e)) => {
                tracing::debug!(probe_target = %self.latency_target, error = %e, "latency probe failed");
                None
            }
            Err(_) => {
                tracing::debug!(probe_target = %self.latency_target, "latency probe timed out");
                None
            }
        }
    }

    /// DNS resolution time for the configured host, in milliseconds.
    async fn probe_dns(&self) -> Option<f64> {
        let start = Instant::now();
        let lookup = format!("{}:80", self.dns_probe_host);
        match timeout(self.probe_timeout, tokio::net::lookup_host(lookup)).await {
            Ok(Ok(mut addrs)) => addrs
                .next()
                .map(|_| start.elapsed().as_secs_f64() * 1000.0),
            Ok(Err(e)) => {
                tracing::debug!(host = %self.dns_probe_host, error = %e, "dns probe failed");
                None
            }
            Err(_) => {
                tracing::debug!(host = %self.dns_probe_host, "dns probe timed out");
                None
            }
        }
    }
}

impl MetricSource for NetworkSource {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn sample(&self) -> Result<Fragment, SourceError> {
        let networks = self.networks.clone();
        let counters = tokio::task::spawn_blocking(move || {
            let mut guard = networks
                .lock()
                .map_err(|e| SourceError::Transient(format!("networks lock poisoned: {}", e)))?;
            guard.refresh(true);

            let mut bytes_sent: u64 = 0;
            let mut bytes_recv: u64 = 0;
            let mut packets: u64 = 0;
            let mut errors: u64 = 0;
            let mut interfaces: Vec<InterfaceStat> = Vec::new();
            for (name, data) in guard.list() {
                bytes_sent = bytes_sent.saturating_add(data.total_transmitted());
                bytes_recv = bytes_recv.saturating_add(data.total_received());
                packets = packets
                    .saturating_add(data.total_packets_transmitted())
                    .saturating_add(data.total_packets_received());
                errors = errors
                    .saturating_add(data.total_errors_on_transmitted())
                    .saturating_add(data.total_errors_on_received());
                interfaces.push(InterfaceStat {
                    name: name.clone(),
                    is_up: linux::read_interface_up(name),
                    bytes_sent_total: data.total_transmitted(),
                    bytes_recv_total: data.total_received(),
                });
            }
            interfaces.sort_by(|a, b| a.name.cmp(&b.name));

            // Socket tables are Linux-only; absence is structural, not an
            // error for the rest of the fragment.
            let sockets = std::fs::read_to_string("/proc/net/tcp")
                .ok()
                .map(|content| proc_net::summarize(&proc_net::parse_tcp_table(&content)));

            Ok::<_, SourceError>((
                bytes_sent, bytes_recv, packets, errors, interfaces, sockets,
            ))
        })
        .await
        .map_err(|e| SourceError::Transient(format!("network task join: {}", e)))??;

        let (bytes_sent, bytes_recv, packets, errors, interfaces, sockets) = counters;
        let (open_ports, connections) = match sockets {
            Some((ports, conns)) => (Some(ports), Some(conns)),
            None => (None, None),
        };

        let (latency_ms, dns_ms) = tokio::join!(self.probe_latency(), self.probe_dns());

        Ok(Fragment::Network(NetworkFragment {
            bytes_sent_total: Some(bytes_sent),
            bytes_recv_total: Some(bytes_recv),
            packets_total: Some(packets),
            errors_total: Some(errors),
            latency_ms,
            dns_ms,
            open_ports,
            connections,
            interfaces: Some(interfaces),
        }))
    }
}
