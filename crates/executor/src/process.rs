//! Process-backed entry points: a compiled task artifact is an executable
//! named after the task id inside the artifacts directory.

use crate::logs::LogSink;
use crate::resolver::{EntryPoint, EntryPointResolver, Resolution, TaskFault};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use taskbridge_core::TaskId;
use tracing::debug;

/// Resolves task ids to executable artifacts on disk.
pub struct ArtifactResolver {
    artifacts_dir: PathBuf,
}

impl ArtifactResolver {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
        }
    }
}

impl EntryPointResolver for ArtifactResolver {
    fn resolve(&self, task_id: &TaskId) -> Resolution {
        let path = self.artifacts_dir.join(task_id.as_str());
        if !path.is_file() {
            debug!("No artifact for task {task_id} at {}", path.display());
            return Resolution::NotFound;
        }

        if !is_executable(&path) {
            return Resolution::MissingEntryPoint {
                symbol: path.display().to_string(),
            };
        }

        Resolution::Runnable(Box::new(ProcessEntryPoint { path }))
    }
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &std::path::Path) -> bool {
    true
}

/// Invokes an artifact with no arguments, capturing its output lines.
struct ProcessEntryPoint {
    path: PathBuf,
}

impl EntryPoint for ProcessEntryPoint {
    fn invoke(&self, sink: &mut LogSink) -> Result<Option<String>, TaskFault> {
        let output = Command::new(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| TaskFault::new(format!("failed to launch artifact: {e}")))?;

        sink.log_block(&String::from_utf8_lossy(&output.stdout));
        let stderr = String::from_utf8_lossy(&output.stderr);
        sink.log_block(&stderr);

        if output.status.success() {
            Ok(None)
        } else {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            Err(TaskFault::new(format!("artifact exited with status {code}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_script(dir: &std::path::Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn missing_artifact_resolves_to_not_found() {
        let dir = TempDir::new().unwrap();
        let resolver = ArtifactResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve(&TaskId::from("Ghost")),
            Resolution::NotFound
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_artifact_lacks_entry_point() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Flat"), "not runnable").unwrap();

        let resolver = ArtifactResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve(&TaskId::from("Flat")),
            Resolution::MissingEntryPoint { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn artifact_output_is_captured_in_order() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "Foo", "echo one\necho two");

        let resolver = ArtifactResolver::new(dir.path());
        let Resolution::Runnable(entry) = resolver.resolve(&TaskId::from("Foo")) else {
            panic!("expected runnable artifact");
        };

        let mut sink = LogSink::new();
        let value = entry.invoke(&mut sink).unwrap();
        assert_eq!(value, None);
        assert_eq!(sink.into_lines(), vec!["one", "two"]);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_becomes_a_fault() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "Bar", "echo before\nexit 3");

        let resolver = ArtifactResolver::new(dir.path());
        let Resolution::Runnable(entry) = resolver.resolve(&TaskId::from("Bar")) else {
            panic!("expected runnable artifact");
        };

        let mut sink = LogSink::new();
        let fault = entry.invoke(&mut sink).unwrap_err();
        assert!(fault.message.contains("status 3"));
        // Output captured before the fault is still there.
        assert_eq!(sink.into_lines(), vec!["before"]);
    }
}
