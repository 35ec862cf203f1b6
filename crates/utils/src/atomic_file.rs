//! Atomic file operations to prevent partially written state and result files

use std::fs;
use std::io::Write;
use std::path::Path;
use taskbridge_core::{Error, Result};
use uuid::Uuid;

/// Write data to a file atomically: stage a temporary file in the same
/// directory, fsync it, then rename over the destination. Observers see
/// either the old content or the new, never a partial write.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::configuration("Invalid file path: no parent directory"))?;

    fs::create_dir_all(parent)
        .map_err(|e| Error::file_system(parent.to_path_buf(), "create parent directory", e))?;

    // Staged in the same directory so the rename stays on one filesystem.
    let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4()));

    if let Err(e) = stage(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::file_system(path.to_path_buf(), "atomic rename", e)
    })
}

fn stage(temp_path: &Path, content: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temp_path)
        .map_err(|e| Error::file_system(temp_path, "create temporary file", e))?;
    file.write_all(content)
        .map_err(|e| Error::file_system(temp_path, "write to temporary file", e))?;
    file.sync_all()
        .map_err(|e| Error::file_system(temp_path, "sync temporary file", e))
}

/// Write string content to a file atomically
pub fn write_atomic_string(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        write_atomic_string(&file_path, "Hello, World!").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Hello, World!");
    }

    #[test]
    fn creates_missing_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("test.txt");

        write_atomic_string(&file_path, "Test").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Test");
    }

    #[test]
    fn overwrites_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "Old content").unwrap();

        write_atomic_string(&file_path, "New content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "New content");
    }

    #[test]
    fn leaves_no_temp_files_behind() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        write_atomic_string(&file_path, "content").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
