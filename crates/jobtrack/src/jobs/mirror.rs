use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::JobRecord;

/// Local JSON copy of the last snapshot fetched from the job store, for offline display.
#[derive(Debug, Clone)]
pub struct SnapshotMirror {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct MirrorDocument {
    saved_at: DateTime<Utc>,
    applications: Vec<JobRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("failed to access snapshot mirror {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot mirror {} is not valid JSON: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, jobs: &[JobRecord]) -> Result<(), MirrorError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let document = MirrorDocument {
            saved_at: Utc::now(),
            applications: jobs.to_vec(),
        };
        let payload = serde_json::to_vec_pretty(&document).map_err(|source| MirrorError::Format {
            path: self.path.clone(),
            source,
        })?;

        fs::write(&self.path, payload).map_err(|source| self.io_error(source))
    }

    /// Returns `Ok(None)` when nothing has been mirrored yet.
    pub fn load(&self) -> Result<Option<Vec<JobRecord>>, MirrorError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        let document: MirrorDocument =
            serde_json::from_slice(&raw).map_err(|source| MirrorError::Format {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(document.applications))
    }

    fn io_error(&self, source: std::io::Error) -> MirrorError {
        MirrorError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
