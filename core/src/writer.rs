#![deny(missing_docs)]

//! # Output Writer
//!
//! Idempotent artifact writes: parent directories are created on demand and a
//! file whose content is already identical is left untouched.

use crate::error::AppResult;
use std::fs;
use std::path::Path;

/// What happened to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or replaced.
    Written,
    /// The file already held this exact content.
    Unchanged,
}

/// Writes `content` to `path`, creating missing parent directories.
pub fn write_artifact(path: &Path, content: &str) -> AppResult<WriteOutcome> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            tracing::debug!(path = %path.display(), "artifact unchanged");
            return Ok(WriteOutcome::Unchanged);
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;
    tracing::info!(path = %path.display(), "artifact written");
    Ok(WriteOutcome::Written)
}
