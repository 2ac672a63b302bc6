// Domain models: per-source fragments, the merged Snapshot, derived states.

mod filesystem;
mod network;
mod snapshot;
mod state;
mod system;

pub use filesystem::{FilesystemMetrics, FsFragment};
pub use network::{ConnectionStat, InterfaceStat, NetworkFragment, NetworkMetrics};
pub use snapshot::Snapshot;
pub use state::{Bottleneck, DerivedState, NetworkTraffic, SecurityState, SystemLoad, Trend};
pub use system::{ProcessStat, SystemFragment, SystemMetrics};
