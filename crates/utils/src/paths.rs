//! Path utilities for taskbridge-specific file locations

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::{env, fs};
use taskbridge_core::constants::STATE_FILE_NAME;

/// Get the directory for taskbridge temporary files
///
/// Returns the platform-appropriate base directory for durable state:
/// - Unix: `/tmp/taskbridge-$USER`
/// - Windows: `%TEMP%\taskbridge-$USER`
pub fn get_taskbridge_temp_dir() -> PathBuf {
    let user = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "default".to_string());

    #[cfg(unix)]
    {
        PathBuf::from(format!("/tmp/taskbridge-{user}"))
    }

    #[cfg(not(unix))]
    {
        let temp_dir = env::temp_dir();
        temp_dir.join(format!("taskbridge-{user}"))
    }
}

/// Generate a hash for a directory path to create unique state directories
pub fn get_directory_hash(dir: &Path) -> String {
    let mut hasher = Sha256::new();

    // Use canonical path to handle symlinks consistently
    let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    hasher.update(canonical.to_string_lossy().as_bytes());

    // Take first 16 chars of hex for reasonable length
    let full_hash = format!("{:x}", hasher.finalize());
    full_hash.chars().take(16).collect()
}

/// Get the state directory for a specific watch directory
pub fn get_state_dir(watch_dir: &Path) -> PathBuf {
    let base_dir = get_taskbridge_temp_dir();
    let dir_hash = get_directory_hash(watch_dir);

    base_dir.join("state").join(dir_hash)
}

/// Get the durable state file path for a specific watch directory
pub fn get_state_file_path(watch_dir: &Path) -> PathBuf {
    get_state_dir(watch_dir).join(STATE_FILE_NAME)
}

/// Ensure the state directory exists for a specific watch directory
pub fn ensure_state_dir_exists(watch_dir: &Path) -> std::io::Result<()> {
    let state_dir = get_state_dir(watch_dir);
    fs::create_dir_all(state_dir)?;
    Ok(())
}
