// Filesystem watch: snapshot of path -> mtime for entries under the
// configured roots. The assembler diffs consecutive maps to find changes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{Fragment, MetricSource, SourceError};
use crate::models::FsFragment;

pub struct FsWatchSource {
    roots: Vec<PathBuf>,
}

impl FsWatchSource {
    pub fn new(paths: &[String]) -> Self {
        Self {
            roots: paths.iter().map(PathBuf::from).collect(),
        }
    }
}

impl MetricSource for FsWatchSource {
    fn name(&self) -> &'static str {
        "fswatch"
    }

    async fn sample(&self) -> Result<Fragment, SourceError> {
        let roots = self.roots.clone();
        let fragment = tokio::task::spawn_blocking(move || {
            if !roots.is_empty() && roots.iter().all(|r| !r.exists()) {
                return Err(SourceError::Unsupported(format!(
                    "no watch root exists: {:?}",
                    roots
                )));
            }
            let mut mtimes = BTreeMap::new();
            for root in &roots {
                let entries = match std::fs::read_dir(root) {
                    Ok(entries) => entries,
                    // A root can vanish and come back (unmounts, tmpdirs);
                    // the remaining roots still get sampled.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        tracing::debug!(root = %root.display(), "watch root missing this cycle");
                        continue;
                    }
                    Err(e) => {
                        return Err(SourceError::Transient(format!(
                            "read_dir {}: {}",
                            root.display(),
                            e
                        )));
                    }
                };
                for entry in entries.flatten() {
                    // Entries that vanish or deny metadata mid-walk are skipped.
                    let Ok(metadata) = entry.metadata() else {
                        continue;
                    };
                    if !metadata.is_file() {
                        continue;
                    }
                    let Ok(modified) = metadata.modified() else {
                        continue;
                    };
                    let Ok(since_epoch) = modified.duration_since(std::time::UNIX_EPOCH) else {
                        continue;
                    };
                    mtimes.insert(
                        entry.path().to_string_lossy().into_owned(),
                        since_epoch.as_millis() as u64,
                    );
                }
            }
            Ok(FsFragment { mtimes })
        })
        .await
        .map_err(|e| SourceError::Transient(format!("fswatch task join: {}", e)))??;

        Ok(Fragment::Filesystem(fragment))
    }
}
