//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Handles ~/.dataplan/ and its config file.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the dataplan directory (~/.dataplan/)
pub fn dataplan_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".dataplan"))
}

/// Get the config file path (~/.dataplan/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(dataplan_dir()?.join("config.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the dataplan directory, creating if it doesn't exist
pub fn ensure_dataplan_dir() -> AppResult<PathBuf> {
    let path = dataplan_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
