//! The single cooperative polling loop.

use crate::compile::CompileEvent;
use crate::machine::{unix_now, Orchestrator};
use taskbridge_core::Result;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Run the watcher until the enabled flag is cleared.
///
/// One task is scanned, possibly compiled, and possibly executed per tick;
/// compile events interleave on the same loop, so there is never concurrent
/// task work. Orchestration errors are logged and the loop keeps going — a
/// failed tick just means the task stays pending for the next one.
pub async fn run_watch_loop(
    mut orchestrator: Orchestrator,
    mut events: mpsc::UnboundedReceiver<CompileEvent>,
    scan_interval: std::time::Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(scan_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !orchestrator.watcher_enabled() {
                    info!("Watcher disabled, stopping");
                    break;
                }
                if let Err(e) = orchestrator.tick(unix_now()) {
                    error!("Tick failed: {e}");
                }
            }
            Some(event) = events.recv() => {
                let outcome = match event {
                    CompileEvent::UnitCompiled { diagnostics } => {
                        orchestrator.handle_unit_compiled(diagnostics)
                    }
                    CompileEvent::Finished => orchestrator.handle_compilation_finished(),
                };
                if let Err(e) = outcome {
                    error!("Compile event handling failed: {e}");
                }
            }
        }
    }

    Ok(())
}
