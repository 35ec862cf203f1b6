//! Runtime configuration for the watcher.

use crate::constants::{
    DEFAULT_PENDING_TIMEOUT_SECS, DEFAULT_SCAN_INTERVAL_SECS, DEFAULT_SOURCE_EXT,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one watched task directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory externally authored task sources are dropped into.
    pub watch_dir: PathBuf,
    /// Extension of task source files (without the leading dot).
    #[serde(default = "default_source_ext")]
    pub source_extension: String,
    /// Directory where compiled task artifacts are expected to appear.
    pub artifacts_dir: PathBuf,
    /// External build command driving the compilation service. When absent,
    /// compilation is assumed to be handled entirely out of band.
    #[serde(default)]
    pub build_command: Option<String>,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_pending_timeout")]
    pub pending_timeout_secs: u64,
}

fn default_source_ext() -> String {
    DEFAULT_SOURCE_EXT.to_string()
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

fn default_pending_timeout() -> u64 {
    DEFAULT_PENDING_TIMEOUT_SECS
}

impl Settings {
    /// Settings with defaults for a watch directory; artifacts live in an
    /// `artifacts` subdirectory unless overridden.
    pub fn new(watch_dir: impl Into<PathBuf>) -> Self {
        let watch_dir = watch_dir.into();
        let artifacts_dir = watch_dir.join("artifacts");
        Self {
            watch_dir,
            source_extension: default_source_ext(),
            artifacts_dir,
            build_command: None,
            scan_interval_secs: default_scan_interval(),
            pending_timeout_secs: default_pending_timeout(),
        }
    }

    /// Path of the source file for a task id.
    pub fn source_path(&self, id: &str) -> PathBuf {
        self.watch_dir
            .join(format!("{id}.{}", self.source_extension))
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let settings = Settings::new("/watch");
        assert_eq!(settings.source_extension, "src");
        assert_eq!(settings.scan_interval_secs, 1);
        assert_eq!(settings.pending_timeout_secs, 5);
        assert_eq!(settings.artifacts_dir, PathBuf::from("/watch/artifacts"));
    }

    #[test]
    fn source_path_uses_configured_extension() {
        let mut settings = Settings::new("/watch");
        settings.source_extension = "task".to_string();
        assert_eq!(settings.source_path("Foo"), PathBuf::from("/watch/Foo.task"));
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let settings: Settings = serde_json::from_str(
            r#"{"watch_dir": "/watch", "artifacts_dir": "/watch/artifacts"}"#,
        )
        .unwrap();
        assert_eq!(settings.pending_timeout_secs, 5);
        assert!(settings.build_command.is_none());
    }
}
