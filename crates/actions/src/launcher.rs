//! Process launcher — starts programs and opens URLs/folders.
//!
//! Programs are spawned detached with null stdio; only the spawn itself is
//! checked. URLs and folders go through the platform opener
//! (`xdg-open`, `open`, or `cmd /C start`).

use std::process::Stdio;
use steward_core::error::ActionError;
use steward_core::{LaunchTarget, Launcher};
use tokio::process::Command;
use tracing::{debug, warn};

/// Launches targets as child processes of the assistant.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

/// The command that hands `target` to the desktop's default handler.
pub(crate) fn opener(target: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        // The empty string is the window title `start` expects first
        cmd.args(["/C", "start", "", target]);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(target);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(target);
        cmd
    }
}

/// Spawn without waiting. The child is not killed when its handle drops.
pub(crate) fn spawn_detached(mut cmd: Command, label: &str) -> Result<(), ActionError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);

    match cmd.spawn() {
        Ok(child) => {
            debug!(target = %label, pid = child.id(), "Process started");
            Ok(())
        }
        Err(e) => {
            warn!(target = %label, error = %e, "Failed to start process");
            Err(ActionError::SpawnFailed {
                target: label.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, target: &LaunchTarget) -> Result<(), ActionError> {
        let cmd = match target {
            LaunchTarget::Program(program) if cfg!(target_os = "macos") => {
                // Bundle names like "Calculator" resolve through LaunchServices
                let mut cmd = Command::new("open");
                cmd.args(["-a", program]);
                cmd
            }
            LaunchTarget::Program(program) => Command::new(program),
            LaunchTarget::Url(url) => opener(url),
        };
        spawn_detached(cmd, &target.to_string())
    }
}
