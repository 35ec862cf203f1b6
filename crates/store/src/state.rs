//! Durable process-wide state: the pending-compilation marker and the
//! watcher's enabled flag.
//!
//! Both values must survive a process restart; `enabled` additionally
//! survives across independent invocations (`start` and `stop` run as
//! separate processes). The in-memory copy is the source of truth between
//! mutations and is persisted atomically on every change.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskbridge_core::{PendingMarker, Result, TaskId};
use taskbridge_utils::{ensure_state_dir_exists, get_state_file_path, write_atomic_string};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending: Option<PendingMarker>,
}

/// Durable key-value state with an explicit lifecycle: loaded at
/// construction, persisted on every mutation, reloadable to observe
/// changes made by another process.
///
/// Clones share the same in-memory state.
#[derive(Clone)]
pub struct StateStore {
    state: Arc<Mutex<PersistedState>>,
    state_file: PathBuf,
}

impl StateStore {
    /// Open (or initialize) the state for a watch directory.
    pub fn open(watch_dir: &Path) -> Result<Self> {
        ensure_state_dir_exists(watch_dir)
            .map_err(|e| taskbridge_core::Error::file_system(watch_dir, "create state dir", e))?;
        let state_file = get_state_file_path(watch_dir);
        Ok(Self::load(state_file))
    }

    /// Open state backed by an explicit file path.
    pub fn open_at(state_file: impl Into<PathBuf>) -> Self {
        Self::load(state_file.into())
    }

    fn load(state_file: PathBuf) -> Self {
        let state = if state_file.exists() {
            match fs::read_to_string(&state_file) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    warn!("Discarding unparseable state file: {e}");
                    PersistedState::default()
                }),
                Err(_) => PersistedState::default(),
            }
        } else {
            PersistedState::default()
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            state_file,
        }
    }

    /// Re-read the persisted state, picking up mutations made by another
    /// process (a `stop` issued while the watch loop runs).
    pub fn reload(&self) {
        let fresh = Self::load(self.state_file.clone());
        let fresh_state = fresh.state.lock().clone();
        *self.state.lock() = fresh_state;
    }

    pub fn enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.state.lock().enabled = enabled;
        self.persist()
    }

    /// The single live pending marker, if any.
    pub fn pending(&self) -> Option<PendingMarker> {
        self.state.lock().pending.clone()
    }

    /// Record the task currently awaiting compilation. Must be durably
    /// committed before the compile request is issued, so the decision
    /// survives a restart triggered by the build itself.
    pub fn set_pending(&self, task_id: TaskId, now: u64) -> Result<()> {
        debug!("Persisting pending marker for task: {task_id}");
        self.state.lock().pending = Some(PendingMarker::new(task_id, now));
        self.persist()
    }

    /// Clear the marker once the compilation outcome has been consumed.
    pub fn clear_pending(&self) -> Result<()> {
        self.state.lock().pending = None;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let json = {
            let state = self.state.lock();
            serde_json::to_string_pretty(&*state)?
        };
        write_atomic_string(&self.state_file, &json)
    }
}
