// Metric sources: each samples one telemetry area and produces a typed
// fragment. Partial failure inside a source yields a partial fragment, never
// a whole-source error.

mod fswatch;
mod linux;
mod network;
pub mod proc_net;
mod system;

use std::future::Future;

pub use fswatch::FsWatchSource;
pub use network::NetworkSource;
pub use system::SystemSource;

use crate::models::{FsFragment, NetworkFragment, SystemFragment};

/// Partial telemetry output from a single source for one cycle.
#[derive(Debug, Clone)]
pub enum Fragment {
    System(SystemFragment),
    Network(NetworkFragment),
    Filesystem(FsFragment),
}

impl Fragment {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::Network(_) => "network",
            Self::Filesystem(_) => "filesystem",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0}")]
    Transient(String),
    /// The capability does not exist on this host; retrying cannot help.
    #[error("unsupported on this host: {0}")]
    Unsupported(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

pub trait MetricSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn sample(&self) -> impl Future<Output = Result<Fragment, SourceError>> + Send;
}
