// The merged, immutable per-cycle telemetry reading.

use serde::{Deserialize, Serialize};

use super::{FilesystemMetrics, NetworkMetrics, SystemMetrics};

/// One cycle's merged telemetry. Immutable after assembly; published behind
/// an Arc and retained only as "previous" for the next cycle's delta math.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp_ms: u64,
    pub system: SystemMetrics,
    pub network: NetworkMetrics,
    pub filesystem: FilesystemMetrics,
}

impl Snapshot {
    /// Seconds elapsed since `previous`, or None when the clock did not
    /// advance (rates cannot be derived from a non-positive interval).
    pub fn elapsed_since(&self, previous: &Snapshot) -> Option<f64> {
        if self.timestamp_ms > previous.timestamp_ms {
            Some((self.timestamp_ms - previous.timestamp_ms) as f64 / 1000.0)
        } else {
            None
        }
    }
}
