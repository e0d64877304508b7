use std::path::PathBuf;
use thiserror::Error;

/// Failures a job caller may want to tell apart
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("Database schema is invalid - missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),

    #[error("Folder {folder} has {found} image(s), at least 2 are required")]
    NotEnoughImages { folder: String, found: usize },

    #[error("Downloads directory not found: {}", .0.display())]
    DownloadsDirMissing(PathBuf),

    #[error("{label} failed after {attempts} attempts: {last_error:#}")]
    RetriesExhausted {
        label: String,
        attempts: u32,
        last_error: anyhow::Error,
    },
}
