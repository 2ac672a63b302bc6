// Filesystem change tracking: path -> mtime maps diffed cycle over cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw output of one FsWatchSource sample: every tracked path with its
/// mtime in unix milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsFragment {
    pub mtimes: BTreeMap<String, u64>,
}

/// Filesystem section of a Snapshot. `tracked` is the mtime map used for the
/// next cycle's diff; when the source failed this cycle (`available` false)
/// it carries the last observed map forward and `changed_paths` is empty
/// because nothing could be compared, not because nothing changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemMetrics {
    pub available: bool,
    pub changed_paths: Vec<String>,
    pub tracked: BTreeMap<String, u64>,
}

impl FilesystemMetrics {
    pub fn unavailable(previous_tracked: BTreeMap<String, u64>) -> Self {
        Self {
            available: false,
            changed_paths: Vec::new(),
            tracked: previous_tracked,
        }
    }
}
