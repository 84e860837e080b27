//! Cross-Platform Path Utilities
//!
//! Functions for resolving the application's local state directory
//! (~/.leaselens/) across platforms.

use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the LeaseLens directory (~/.leaselens/)
pub fn leaselens_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".leaselens"))
}

/// Get the client preferences file path (~/.leaselens/prefs.json)
pub fn prefs_path() -> AppResult<PathBuf> {
    Ok(leaselens_dir()?.join("prefs.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the LeaseLens directory, creating if it doesn't exist
pub fn ensure_leaselens_dir() -> AppResult<PathBuf> {
    let path = leaselens_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
