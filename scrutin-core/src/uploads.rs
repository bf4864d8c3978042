use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::Result;

/// Filesystem store for uploaded candidate media (profile photos,
/// manifestos). The registration flow writes files here; the orchestrator
/// only serves the directory and purges it at teardown/reset.
#[derive(Debug, Clone)]
pub struct CandidateMediaStore {
    root: PathBuf,
}

impl CandidateMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory so static serving has a target on first boot.
    pub async fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Removes every stored file, returning how many were deleted.
    /// A missing directory counts as already purged.
    pub async fn purge(&self) -> Result<u64> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "Candidate media directory {} does not exist, nothing to purge",
                    self.root.display()
                );
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0u64;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() {
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) => {
                        warn!("Failed to remove candidate media {}: {}", path.display(), e)
                    }
                }
            }
        }

        if removed > 0 {
            debug!("Purged {removed} candidate media files");
        }
        Ok(removed)
    }
}
