//! Subcommand definitions and dispatch.

use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use taskbridge_core::{Settings, TaskId};
use taskbridge_executor::{ArtifactResolver, EntryPointResolver, TaskExecutor};
use taskbridge_orchestrator::{
    machine::unix_now, run_watch_loop, CommandCompileService, CompileService, Orchestrator,
    OutOfBandCompileService,
};
use taskbridge_store::{ResultStore, StateStore, TaskFiles};
use tokio::sync::mpsc;
use tracing::info;

/// Options shared by every command that touches a watch directory.
#[derive(Args, Clone)]
pub struct WatchArgs {
    /// Watched task directory
    #[arg(long = "dir", default_value = ".")]
    pub watch_dir: PathBuf,

    /// Extension of task source files (without the dot)
    #[arg(long, default_value = taskbridge_core::constants::DEFAULT_SOURCE_EXT)]
    pub source_ext: String,

    /// Directory compiled task artifacts appear in (default: <dir>/artifacts)
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// External build command to trigger per compilation pass
    #[arg(long)]
    pub build_command: Option<String>,

    /// Seconds to wait for a compilation signal before assuming success
    #[arg(long, default_value_t = taskbridge_core::constants::DEFAULT_PENDING_TIMEOUT_SECS)]
    pub pending_timeout: u64,
}

impl WatchArgs {
    fn settings(&self) -> Settings {
        let mut settings = Settings::new(&self.watch_dir);
        settings.source_extension = self.source_ext.clone();
        if let Some(artifacts_dir) = &self.artifacts_dir {
            settings.artifacts_dir = artifacts_dir.clone();
        }
        settings.build_command = self.build_command.clone();
        settings.pending_timeout_secs = self.pending_timeout;
        settings
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enable the watcher and run it until stopped
    Start {
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Disable a running watcher and drop any pending marker
    Stop {
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Show the persisted watcher state
    Status {
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Execute a single task immediately, bypassing the scanner
    Run {
        /// Path to the task source file
        task_file: PathBuf,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Delete all files for tasks that have completed
    CleanCompleted {
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Delete all task files, completed or not
    CleanAll {
        #[command(flatten)]
        watch: WatchArgs,
    },
}

impl Commands {
    pub async fn execute(self) -> eyre::Result<()> {
        match self {
            Commands::Start { watch } => start(watch).await,
            Commands::Stop { watch } => stop(&watch),
            Commands::Status { watch } => status(&watch),
            Commands::Run { task_file, watch } => run_single(&task_file, &watch),
            Commands::CleanCompleted { watch } => clean(&watch, true),
            Commands::CleanAll { watch } => clean(&watch, false),
        }
    }
}

async fn start(watch: WatchArgs) -> eyre::Result<()> {
    let settings = watch.settings();
    fs::create_dir_all(&settings.watch_dir)?;

    let state = StateStore::open(&settings.watch_dir)?;
    state.set_enabled(true)?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let compiler: Arc<dyn CompileService> = match &settings.build_command {
        Some(command) => Arc::new(CommandCompileService::new(command.clone(), events_tx)),
        None => Arc::new(OutOfBandCompileService),
    };
    let resolver: Arc<dyn EntryPointResolver> =
        Arc::new(ArtifactResolver::new(&settings.artifacts_dir));

    info!("Enabled. Watching: {}", settings.watch_dir.display());
    let scan_interval = settings.scan_interval();
    let orchestrator = Orchestrator::new(settings, state, resolver, compiler);
    run_watch_loop(orchestrator, events_rx, scan_interval).await?;
    Ok(())
}

fn stop(watch: &WatchArgs) -> eyre::Result<()> {
    let state = StateStore::open(&watch.watch_dir)?;
    state.set_enabled(false)?;
    state.clear_pending()?;
    println!("Stopped.");
    Ok(())
}

fn status(watch: &WatchArgs) -> eyre::Result<()> {
    let state = StateStore::open(&watch.watch_dir)?;
    println!(
        "state file: {}",
        taskbridge_utils::get_state_file_path(&watch.watch_dir).display()
    );
    println!("enabled: {}", state.enabled());
    match state.pending() {
        Some(marker) => println!(
            "pending: {} (for {}s)",
            marker.task_id,
            marker.elapsed(unix_now())
        ),
        None => println!("pending: none"),
    }
    Ok(())
}

fn run_single(task_file: &std::path::Path, watch: &WatchArgs) -> eyre::Result<()> {
    let settings = watch.settings();
    let Some(task_id) = TaskId::from_source_file(task_file) else {
        eyre::bail!("not a task source file: {}", task_file.display());
    };

    let resolver: Arc<dyn EntryPointResolver> =
        Arc::new(ArtifactResolver::new(&settings.artifacts_dir));
    let executor = TaskExecutor::new(resolver, ResultStore::new(&settings.watch_dir));
    let result = executor.execute(&task_id)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Delete task files; when `completed_only`, keep tasks that have no done
/// marker yet.
fn clean(watch: &WatchArgs, completed_only: bool) -> eyre::Result<()> {
    let settings = watch.settings();
    let store = ResultStore::new(&settings.watch_dir);
    let files = TaskFiles::new(&settings.watch_dir);

    let mut count = 0usize;
    if settings.watch_dir.is_dir() {
        for entry in fs::read_dir(&settings.watch_dir)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(settings.source_extension.as_str())
            {
                continue;
            }
            let Some(task_id) = TaskId::from_source_file(&path) else {
                continue;
            };
            if completed_only && !files.done_path(&task_id).exists() {
                continue;
            }
            store.delete_task_files(&task_id, &settings.source_extension)?;
            count += 1;
        }
    }

    println!("Cleaned {count} tasks.");
    Ok(())
}
