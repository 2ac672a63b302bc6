// Cycle driver: sequences sampling, assembly, classification, and publish on
// a fixed cadence. Sources sample concurrently under a per-source deadline;
// one bad source or one bad cycle never stops the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior, interval, timeout};

use crate::assembler::assemble;
use crate::bus::Bus;
use crate::classifier::classify;
use crate::config::Thresholds;
use crate::models::Snapshot;
use crate::retry::RetryPolicy;
use crate::sources::{Fragment, MetricSource};

/// Rate limit for "no subscribers" logging (avoid a line every cycle when
/// nothing is listening).
const NO_SUBSCRIBERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Sources, bus, and shutdown for the driver.
pub struct DriverDeps<S, N, F> {
    pub system: Arc<S>,
    pub network: Arc<N>,
    pub fswatch: Arc<F>,
    pub bus: Bus,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct DriverConfig {
    pub cycle_interval_ms: u64,
    pub source_deadline_ms: u64,
    pub retry: RetryPolicy,
    pub thresholds: Thresholds,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

#[derive(Default)]
struct SkipFlags {
    system: bool,
    network: bool,
    fswatch: bool,
}

enum SampleOutcome {
    Fragment(Box<Fragment>),
    /// Structural failure: stop probing this source.
    Unsupported,
    /// Transient failure: unavailable this cycle only.
    Unavailable,
}

pub fn spawn<S, N, F>(deps: DriverDeps<S, N, F>, config: DriverConfig) -> tokio::task::JoinHandle<()>
where
    S: MetricSource + 'static,
    N: MetricSource + 'static,
    F: MetricSource + 'static,
{
    let DriverDeps {
        system,
        network,
        fswatch,
        bus,
        mut shutdown_rx,
    } = deps;
    let DriverConfig {
        cycle_interval_ms,
        source_deadline_ms,
        retry,
        thresholds,
        stats_log_interval_secs,
    } = config;

    let deadline = Duration::from_millis(source_deadline_ms);
    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(cycle_interval_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut previous: Option<Arc<Snapshot>> = None;
        let mut skip = SkipFlags::default();
        let mut cycles_total: u64 = 0;
        let mut published_total: u64 = 0;
        let mut last_no_subscribers_log: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    // A clock reading before the epoch would poison the next
                    // cycle's delta math; skip the cycle instead.
                    let timestamp_ms = match std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                    {
                        Ok(d) => d.as_millis() as u64,
                        Err(e) => {
                            tracing::warn!(error = %e, operation = "get_timestamp", "system time error; skipping cycle");
                            continue;
                        }
                    };

                    let (system_outcome, network_outcome, fswatch_outcome) = tokio::join!(
                        sample_source(&*system, deadline, &retry, skip.system),
                        sample_source(&*network, deadline, &retry, skip.network),
                        sample_source(&*fswatch, deadline, &retry, skip.fswatch),
                    );

                    let mut fragments = Vec::with_capacity(3);
                    collect_outcome(system_outcome, &mut fragments, &mut skip.system);
                    collect_outcome(network_outcome, &mut fragments, &mut skip.network);
                    collect_outcome(fswatch_outcome, &mut fragments, &mut skip.fswatch);

                    let snapshot = Arc::new(assemble(fragments, previous.as_deref(), timestamp_ms));
                    let state = Arc::new(classify(&snapshot, previous.as_deref(), &thresholds));

                    tracing::debug!(
                        operation = "cycle",
                        cycle = cycles_total,
                        system_load = %state.system_load,
                        security = %state.security,
                        "cycle complete"
                    );

                    if bus.publish(snapshot.clone(), state) {
                        published_total += 1;
                    } else {
                        let should_log = last_no_subscribers_log
                            .is_none_or(|t| t.elapsed() >= NO_SUBSCRIBERS_LOG_INTERVAL);
                        if should_log {
                            tracing::debug!(
                                operation = "publish",
                                "no subscribers registered; update dropped"
                            );
                            last_no_subscribers_log = Some(Instant::now());
                        }
                    }

                    previous = Some(snapshot);
                    cycles_total += 1;
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Driver shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        cycles_total,
                        published_total,
                        subscribers = bus.subscriber_count(),
                        system_skipped = skip.system,
                        network_skipped = skip.network,
                        fswatch_skipped = skip.fswatch,
                        "app stats"
                    );
                }
            }
        }
    })
}

fn collect_outcome(outcome: SampleOutcome, fragments: &mut Vec<Fragment>, skip: &mut bool) {
    match outcome {
        SampleOutcome::Fragment(fragment) => fragments.push(*fragment),
        SampleOutcome::Unsupported => *skip = true,
        SampleOutcome::Unavailable => {}
    }
}

/// One source's sampling for one cycle. The deadline bounds the whole retried
/// sample, delays included, so a stuck source costs the cycle at most one
/// deadline and never delays the other sources past it. Transient failures
/// are retried by the policy while time remains; structural failures are
/// reported once so the driver can skip the source from then on.
async fn sample_source<S: MetricSource>(
    source: &S,
    deadline: Duration,
    retry: &RetryPolicy,
    skipped: bool,
) -> SampleOutcome {
    if skipped {
        return SampleOutcome::Unavailable;
    }
    let sample = retry.execute(source.name(), || async {
        match source.sample().await {
            Ok(fragment) => Ok(Some(fragment)),
            Err(e) if !e.is_transient() => {
                tracing::warn!(
                    source = source.name(),
                    error = %e,
                    "capability missing on this host; source disabled"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    });
    match timeout(deadline, sample).await {
        Ok(Ok(Some(fragment))) => SampleOutcome::Fragment(Box::new(fragment)),
        Ok(Ok(None)) => SampleOutcome::Unsupported,
        Ok(Err(e)) => {
            tracing::warn!(source = source.name(), error = %e, "source unavailable this cycle");
            SampleOutcome::Unavailable
        }
        Err(_) => {
            tracing::warn!(
                source = source.name(),
                deadline_ms = deadline.as_millis() as u64,
                "source missed the deadline; unavailable this cycle"
            );
            SampleOutcome::Unavailable
        }
    }
}
