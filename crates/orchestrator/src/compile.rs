//! The seam to the external compilation service.
//!
//! The orchestrator only ever *requests* a pass; completion comes back as
//! [`CompileEvent`]s on a channel — once per compiled unit with diagnostics,
//! once when the pass is fully finished. Either event may never arrive if a
//! restart intervenes; the state machine's timeout fallback covers that.

use regex::Regex;
use taskbridge_core::{Diagnostic, Error, Result, Severity};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Signals from the compilation service, mirroring its two host callbacks.
#[derive(Debug, Clone)]
pub enum CompileEvent {
    /// A unit finished compiling, with whatever diagnostics it produced.
    UnitCompiled { diagnostics: Vec<Diagnostic> },
    /// The whole pass is done. Carries no payload; accumulated diagnostics
    /// travel through the recovery side channel.
    Finished,
}

/// Trigger for one opportunistic compilation pass over the task directory.
pub trait CompileService: Send + Sync {
    fn request_compilation(&self) -> Result<()>;
}

/// Compilation handled entirely out of band: requests are recorded but no
/// signal will ever fire, leaving progress to the timeout fallback.
pub struct OutOfBandCompileService;

impl CompileService for OutOfBandCompileService {
    fn request_compilation(&self) -> Result<()> {
        debug!("No build command configured; relying on out-of-band compilation");
        Ok(())
    }
}

/// Runs a configured build command and reports its diagnostics.
///
/// Diagnostics are parsed from the command's output in the conventional
/// `file:line: severity: message` shape. The service always emits a
/// `Finished` event after the command returns, whatever its exit status —
/// success or failure is inferred from diagnostics, not the exit code.
pub struct CommandCompileService {
    build_command: String,
    events: mpsc::UnboundedSender<CompileEvent>,
}

impl CommandCompileService {
    pub fn new(build_command: String, events: mpsc::UnboundedSender<CompileEvent>) -> Self {
        Self {
            build_command,
            events,
        }
    }
}

impl CompileService for CommandCompileService {
    fn request_compilation(&self) -> Result<()> {
        let argv = shlex::split(&self.build_command).ok_or_else(|| {
            Error::compile_request(format!("unparseable build command: {}", self.build_command))
        })?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::compile_request("empty build command"))?;

        debug!("Requesting compilation pass: {}", self.build_command);
        let program = program.to_string();
        let args = args.to_vec();
        let events = self.events.clone();

        tokio::spawn(async move {
            let output = tokio::process::Command::new(&program)
                .args(&args)
                .output()
                .await;

            match output {
                Ok(output) => {
                    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                    text.push_str(&String::from_utf8_lossy(&output.stderr));
                    let diagnostics = parse_diagnostics(&text);
                    let _ = events.send(CompileEvent::UnitCompiled { diagnostics });
                }
                Err(e) => {
                    warn!("Build command '{program}' could not be launched: {e}");
                }
            }

            let _ = events.send(CompileEvent::Finished);
        });

        Ok(())
    }
}

/// Parse `file:line[:col]: severity: message` lines out of build output.
pub fn parse_diagnostics(output: &str) -> Vec<Diagnostic> {
    // Compiled per pass; passes are rare and the output is small.
    let pattern = Regex::new(r"^(?P<file>[^:\s][^:]*):(?P<line>\d+)(?::\d+)?:\s*(?P<severity>error|warning):\s*(?P<message>.+)$")
        .expect("diagnostic pattern is valid");

    output
        .lines()
        .filter_map(|line| {
            let caps = pattern.captures(line.trim_end())?;
            let severity = match &caps["severity"] {
                "error" => Severity::Error,
                _ => Severity::Warning,
            };
            Some(Diagnostic {
                severity,
                message: caps["message"].to_string(),
                file: caps["file"].to_string(),
                line: caps["line"].parse().unwrap_or(0),
            })
        })
        .collect()
}
