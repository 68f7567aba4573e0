//! Artifact persistence
//!
//! Serializes fitted objects (preprocessor, model) to a path and loads them
//! back. Write-once per training run, read on every inference call; the
//! loaded object must be behaviorally equivalent to the saved one.

use crate::error::{Result, ScorecastError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Serialize `value` to `path`, creating parent directories as needed and
/// overwriting any existing file.
pub fn save<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Deserialize a previously saved object from `path`.
///
/// A missing file is reported as `ArtifactMissing` so callers can tell
/// "never trained" apart from a corrupt artifact.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ScorecastError::ArtifactMissing(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&json)?;
    Ok(value)
}
