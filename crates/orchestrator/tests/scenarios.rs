//! End-to-end scenarios: a dropped task source driven through detection,
//! compilation, and execution, observed purely through the filesystem the
//! way an external poller would.

use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use taskbridge_core::{Diagnostic, Result, Settings, TaskId, TaskResult, TaskStatus};
use taskbridge_executor::{
    EntryPoint, EntryPointResolver, LogSink, Resolution, TaskFault,
};
use taskbridge_orchestrator::{CompileService, Orchestrator};
use taskbridge_store::StateStore;
use tempfile::TempDir;

struct ScriptedEntryPoint {
    outcome: std::result::Result<Option<String>, TaskFault>,
    logs: Vec<String>,
}

impl EntryPoint for ScriptedEntryPoint {
    fn invoke(&self, sink: &mut LogSink) -> std::result::Result<Option<String>, TaskFault> {
        for line in &self.logs {
            sink.log(line.clone());
        }
        self.outcome.clone()
    }
}

struct ScriptedResolver {
    resolvable: AtomicBool,
    outcome: std::result::Result<Option<String>, TaskFault>,
    logs: Vec<String>,
}

impl ScriptedResolver {
    fn returning(value: &str) -> Arc<Self> {
        Arc::new(Self {
            resolvable: AtomicBool::new(true),
            outcome: Ok(Some(value.to_string())),
            logs: Vec::new(),
        })
    }

    fn faulting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            resolvable: AtomicBool::new(true),
            outcome: Err(TaskFault::with_trace(message, "at run:1")),
            logs: vec!["starting".to_string()],
        })
    }

    fn unresolvable() -> Arc<Self> {
        Arc::new(Self {
            resolvable: AtomicBool::new(false),
            outcome: Ok(None),
            logs: Vec::new(),
        })
    }
}

impl EntryPointResolver for ScriptedResolver {
    fn resolve(&self, _task_id: &TaskId) -> Resolution {
        if self.resolvable.load(Ordering::SeqCst) {
            Resolution::Runnable(Box::new(ScriptedEntryPoint {
                outcome: self.outcome.clone(),
                logs: self.logs.clone(),
            }))
        } else {
            Resolution::NotFound
        }
    }
}

#[derive(Default)]
struct CountingCompiler {
    requests: AtomicUsize,
}

impl CompileService for CountingCompiler {
    fn request_compilation(&self) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Bridge {
    dir: TempDir,
    state: StateStore,
    compiler: Arc<CountingCompiler>,
}

impl Bridge {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let state = StateStore::open_at(dir.path().join("state.json"));
        Self {
            dir,
            state,
            compiler: Arc::new(CountingCompiler::default()),
        }
    }

    fn orchestrator(&self, resolver: Arc<dyn EntryPointResolver>) -> Orchestrator {
        Orchestrator::new(
            Settings::new(self.dir.path()),
            self.state.clone(),
            resolver,
            Arc::clone(&self.compiler) as Arc<dyn CompileService>,
        )
    }

    fn drop_task(&self, name: &str) {
        fs::write(self.dir.path().join(name), "task body").unwrap();
    }

    fn poll_result(&self, id: &str) -> TaskResult {
        // Poller protocol: only trust content once the marker exists.
        let done = self.dir.path().join(format!("result_{id}.done"));
        assert!(done.exists(), "completion marker missing for {id}");
        let content = fs::read_to_string(self.dir.path().join(format!("result_{id}.json"))).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

#[test]
fn scenario_resolvable_task_succeeds_in_one_tick() {
    let bridge = Bridge::new();
    bridge.drop_task("Foo.src");

    let mut orch = bridge.orchestrator(ScriptedResolver::returning("42"));
    orch.tick(100).unwrap();

    let result = bridge.poll_result("Foo");
    assert_eq!(result.id, TaskId::from("Foo"));
    assert_eq!(result.status, TaskStatus::Success);
    assert_eq!(result.return_value.as_deref(), Some("42"));
    assert_eq!(bridge.compiler.requests.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_faulting_task_reports_runtime_error_with_fault_line() {
    let bridge = Bridge::new();
    bridge.drop_task("Bar.src");

    let mut orch = bridge.orchestrator(ScriptedResolver::faulting("index out of range"));
    orch.tick(100).unwrap();

    let result = bridge.poll_result("Bar");
    assert_eq!(result.status, TaskStatus::RuntimeError);
    assert!(result
        .logs
        .iter()
        .any(|line| line.contains("Runtime error: index out of range")));
    // Logs captured before the fault are preserved ahead of it.
    assert_eq!(result.logs[0], "starting");
}

#[test]
fn scenario_own_file_compile_error_is_not_foreign() {
    let bridge = Bridge::new();
    bridge.drop_task("Baz.src");
    let source = bridge.dir.path().join("Baz.src");

    let mut orch = bridge.orchestrator(ScriptedResolver::unresolvable());
    orch.tick(100).unwrap();
    assert_eq!(bridge.compiler.requests.load(Ordering::SeqCst), 1);
    assert!(bridge.state.pending().is_some());

    orch.handle_unit_compiled(vec![Diagnostic::error(
        "unexpected token",
        source.to_string_lossy(),
        3,
    )])
    .unwrap();
    orch.handle_compilation_finished().unwrap();

    let result = bridge.poll_result("Baz");
    assert_eq!(result.status, TaskStatus::CompilerError);
    assert!(!result.foreign_errors);
    assert!(bridge.state.pending().is_none());
}

#[test]
fn scenario_unrelated_file_compile_error_is_foreign() {
    let bridge = Bridge::new();
    bridge.drop_task("Baz.src");
    let unrelated = bridge.dir.path().join("Unrelated.src");
    fs::write(&unrelated, "other body").unwrap();

    let mut orch = bridge.orchestrator(ScriptedResolver::unresolvable());
    orch.tick(100).unwrap();
    orch.handle_unit_compiled(vec![Diagnostic::error(
        "broken elsewhere",
        unrelated.to_string_lossy(),
        8,
    )])
    .unwrap();
    orch.handle_compilation_finished().unwrap();

    let result = bridge.poll_result("Baz");
    assert_eq!(result.status, TaskStatus::CompilerError);
    assert!(result.foreign_errors);
}

#[test]
fn scenario_timeout_fallback_executes_instead_of_waiting_forever() {
    let bridge = Bridge::new();
    bridge.drop_task("Quiet.src");

    let resolver = ScriptedResolver::unresolvable();
    let mut orch = bridge.orchestrator(Arc::clone(&resolver) as Arc<dyn EntryPointResolver>);

    orch.tick(0).unwrap();
    // The build silently succeeded; its signals were lost.
    resolver.resolvable.store(true, Ordering::SeqCst);

    for now in 1..=5 {
        orch.tick(now).unwrap();
        assert!(
            bridge.state.pending().is_some(),
            "should still be waiting at t={now}"
        );
    }

    orch.tick(6).unwrap();
    assert!(bridge.state.pending().is_none());
    assert_eq!(bridge.poll_result("Quiet").status, TaskStatus::Success);
}

#[test]
fn scenario_restart_mid_build_recovers_diagnostics_from_disk() {
    let bridge = Bridge::new();
    bridge.drop_task("Crashy.src");
    let source = bridge.dir.path().join("Crashy.src");

    {
        let mut orch = bridge.orchestrator(ScriptedResolver::unresolvable());
        orch.tick(100).unwrap();
        orch.handle_unit_compiled(vec![Diagnostic::error(
            "bad syntax",
            source.to_string_lossy(),
            1,
        )])
        .unwrap();
        // The build restarts the process before Finished fires.
    }

    let mut orch = bridge.orchestrator(ScriptedResolver::unresolvable());
    orch.tick(101).unwrap();

    let result = bridge.poll_result("Crashy");
    assert_eq!(result.status, TaskStatus::CompilerError);
    assert!(!result.foreign_errors);
    assert!(bridge.state.pending().is_none());
    assert!(!bridge
        .dir
        .path()
        .join("pending_errors_Crashy.json")
        .exists());
}

#[test]
fn scenario_completed_task_is_never_rerun() {
    let bridge = Bridge::new();
    bridge.drop_task("Once.src");

    let mut orch = bridge.orchestrator(ScriptedResolver::returning("done"));
    orch.tick(100).unwrap();
    let first = bridge.poll_result("Once");

    // Subsequent ticks find no pending work.
    orch.tick(101).unwrap();
    orch.tick(102).unwrap();

    assert_eq!(bridge.poll_result("Once"), first);
    assert_eq!(bridge.compiler.requests.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_tasks_complete_oldest_first() {
    let bridge = Bridge::new();
    bridge.drop_task("First.src");
    std::thread::sleep(std::time::Duration::from_millis(20));
    bridge.drop_task("Second.src");

    let mut orch = bridge.orchestrator(ScriptedResolver::returning("ok"));

    orch.tick(100).unwrap();
    assert!(bridge.dir.path().join("result_First.done").exists());
    assert!(!bridge.dir.path().join("result_Second.done").exists());

    orch.tick(101).unwrap();
    assert!(bridge.dir.path().join("result_Second.done").exists());
}
