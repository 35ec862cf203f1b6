//! The compilation state machine.
//!
//! Driven by a periodic tick rather than event pushes, because the
//! compilation signal can itself trigger a restart before the orchestrator
//! reacts. In-memory state is disposable; the durable pending marker is
//! what reconstructs the machine after a restart.

use crate::classifier;
use crate::compile::CompileService;
use crate::scanner;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use taskbridge_core::{Diagnostic, PendingMarker, Result, Settings, TaskId};
use taskbridge_executor::{EntryPointResolver, Resolution, TaskExecutor};
use taskbridge_store::{RecoveryStore, ResultStore, StateStore};
use tracing::{debug, info, warn};

/// Observable position of the orchestrator. Only the pending marker behind
/// `AwaitingCompilation` is durable; the phase itself is reconstructed from
/// it at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    AwaitingCompilation { task_id: TaskId, since: u64 },
    Executing { task_id: TaskId },
}

/// Detects pending tasks and drives each one through compilation and
/// execution, at most one task in flight at a time.
pub struct Orchestrator {
    settings: Settings,
    state: StateStore,
    results: ResultStore,
    recovery: RecoveryStore,
    resolver: Arc<dyn EntryPointResolver>,
    executor: TaskExecutor,
    compiler: Arc<dyn CompileService>,
    /// Actionable diagnostics accumulated during the current pass.
    collected: Vec<Diagnostic>,
    /// True between a compile request and its `Finished` signal, within this
    /// process's lifetime only. Lost on restart, by design: a restarted
    /// process must fall back to the recovery file and the timeout.
    compile_in_flight: bool,
    phase: Phase,
}

impl Orchestrator {
    pub fn new(
        settings: Settings,
        state: StateStore,
        resolver: Arc<dyn EntryPointResolver>,
        compiler: Arc<dyn CompileService>,
    ) -> Self {
        let results = ResultStore::new(&settings.watch_dir);
        let recovery = RecoveryStore::new(&settings.watch_dir);
        let executor = TaskExecutor::new(Arc::clone(&resolver), results.clone());

        // Reconstruct the phase from the durable marker: the whole reason
        // the marker exists.
        let phase = match state.pending() {
            Some(marker) => {
                info!(
                    "Resuming with pending compilation for task: {}",
                    marker.task_id
                );
                Phase::AwaitingCompilation {
                    task_id: marker.task_id,
                    since: marker.since,
                }
            }
            None => Phase::Idle,
        };

        Self {
            settings,
            state,
            results,
            recovery,
            resolver,
            executor,
            compiler,
            collected: Vec::new(),
            compile_in_flight: false,
            phase,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Reload persisted state and report whether the watcher is enabled.
    /// Picks up a `stop` issued by another process.
    pub fn watcher_enabled(&self) -> bool {
        self.state.reload();
        self.state.enabled()
    }

    /// One polling tick at wall-clock time `now` (unix seconds).
    pub fn tick(&mut self, now: u64) -> Result<()> {
        if let Some(marker) = self.state.pending() {
            return self.tick_awaiting(&marker, now);
        }

        let Some(task_id) =
            scanner::next_pending_task(&self.settings.watch_dir, &self.settings.source_extension)
        else {
            return Ok(());
        };

        if self.is_resolvable(&task_id) {
            info!("Processing task (already compiled): {task_id}");
            return self.run(&task_id);
        }

        info!("New task detected, triggering compilation: {task_id}");
        // Durable marker first: the compile request may restart the process.
        self.state.set_pending(task_id.clone(), now)?;
        self.phase = Phase::AwaitingCompilation {
            task_id: task_id.clone(),
            since: now,
        };
        self.results.clean(&task_id)?;
        self.collected.clear();
        self.compiler.request_compilation()?;
        self.compile_in_flight = true;
        Ok(())
    }

    /// Tick while a pending marker is live.
    fn tick_awaiting(&mut self, marker: &PendingMarker, now: u64) -> Result<()> {
        let expired = marker.elapsed(now) > self.settings.pending_timeout_secs;

        // While the pass runs in this process and the timeout has not
        // elapsed, completion arrives through compile events, not ticks.
        if self.compile_in_flight && !expired {
            return Ok(());
        }

        // Restart recovery, or a compile signal that never came: consume the
        // defensively written diagnostics if they exist.
        if let Some(diagnostics) = self.recovery.take(&marker.task_id)? {
            info!(
                "Consuming recovered diagnostics for task: {}",
                marker.task_id
            );
            return self.conclude_pass(&marker.task_id, diagnostics);
        }

        if expired {
            // No signal in time: assume compilation silently succeeded. A
            // heuristic, not a guarantee; a still-broken build surfaces as a
            // runtime error when resolution fails.
            warn!(
                "No compilation signal for task {} after {}s, assuming success",
                marker.task_id, self.settings.pending_timeout_secs
            );
            self.compile_in_flight = false;
            self.state.clear_pending()?;
            return self.run(&marker.task_id);
        }

        Ok(())
    }

    /// Per-unit compilation callback: accumulate actionable diagnostics and
    /// persist them ahead of a possible restart.
    pub fn handle_unit_compiled(&mut self, diagnostics: Vec<Diagnostic>) -> Result<()> {
        let Some(marker) = self.state.pending() else {
            return Ok(());
        };

        let mut errors: Vec<Diagnostic> = diagnostics
            .into_iter()
            .filter(Diagnostic::is_actionable)
            .collect();
        if errors.is_empty() {
            return Ok(());
        }

        debug!(
            "Collected {} compiler errors for task: {}",
            errors.len(),
            marker.task_id
        );
        self.collected.append(&mut errors);
        // The in-memory accumulator may not survive the rest of the pass.
        self.recovery.persist(&marker.task_id, &self.collected)
    }

    /// Pass-finished callback: the accumulated diagnostics decide between
    /// execution and a compiler-error result.
    pub fn handle_compilation_finished(&mut self) -> Result<()> {
        self.compile_in_flight = false;
        let collected = std::mem::take(&mut self.collected);

        let Some(marker) = self.state.pending() else {
            return Ok(());
        };

        self.conclude_pass(&marker.task_id, collected)
    }

    /// Consume a compilation outcome: clear the marker, then either report
    /// the errors or hand off to execution.
    fn conclude_pass(&mut self, task_id: &TaskId, diagnostics: Vec<Diagnostic>) -> Result<()> {
        self.compile_in_flight = false;
        self.state.clear_pending()?;
        self.recovery.discard(task_id)?;
        self.collected.clear();

        if diagnostics.iter().any(Diagnostic::is_actionable) {
            info!("Compilation failed for task: {task_id}");
            let source = self.settings.source_path(task_id.as_str());
            let result = classifier::classify(task_id, &source, &diagnostics);
            self.results.write(&result)?;
            self.phase = Phase::Idle;
            return Ok(());
        }

        self.run(task_id)
    }

    fn is_resolvable(&self, task_id: &TaskId) -> bool {
        // Code that exists but lacks the entry-point shape still counts as
        // compiled; the executor reports the missing symbol.
        !matches!(self.resolver.resolve(task_id), Resolution::NotFound)
    }

    fn run(&mut self, task_id: &TaskId) -> Result<()> {
        self.phase = Phase::Executing {
            task_id: task_id.clone(),
        };
        let outcome = self.executor.execute(task_id);
        self.phase = Phase::Idle;
        outcome.map(|_| ())
    }
}

/// Current wall-clock time as unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
