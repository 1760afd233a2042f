//! Player process supervisor.
//!
//! Owns the one player process of this agent. Starting walks the launch plan
//! in order and accepts the first profile that survives the settle interval
//! without a fatal signature in its log. Stopping asks the player to quit and
//! kills it if it does not.

mod process;
mod signatures;

pub use process::PlayerProcess;
pub use signatures::FailureSignatures;

use crate::config::{LaunchSpec, PlayerConfig};
use crate::ipc::{Command, IpcChannel};
use crate::{Error, Result};
use std::path::Path;

/// Sole owner of the player process handle.
#[derive(Debug)]
pub struct Supervisor {
    config: PlayerConfig,
    channel: IpcChannel,
    signatures: FailureSignatures,
    process: Option<PlayerProcess>,
}

impl Supervisor {
    pub fn new(config: PlayerConfig) -> Self {
        let channel = IpcChannel::new(config.ipc_path.clone(), config.ipc);
        let signatures =
            FailureSignatures::new(config.failure_signatures.clone(), config.log_tail_bytes);

        Self {
            config,
            channel,
            signatures,
            process: None,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn ipc_path(&self) -> &Path {
        &self.config.ipc_path
    }

    /// Profile the running player was accepted under.
    pub fn active_mode(&self) -> Option<&str> {
        self.process.as_ref().map(PlayerProcess::mode)
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(PlayerProcess::id)
    }

    /// Poll the process without blocking. A handle whose process has exited
    /// is released here.
    pub fn is_alive(&mut self) -> bool {
        let Some(process) = self.process.as_mut() else {
            return false;
        };

        match process.exit_status() {
            None => true,
            Some(status) => {
                tracing::warn!("Player ({}) exited unexpectedly: {}", process.mode(), status);
                self.process = None;
                false
            }
        }
    }

    /// Make sure a player is running. No-op when one already is.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_alive() {
            return Ok(());
        }

        let mut tried = Vec::new();
        for spec in self.config.launch_plan() {
            match self.launch(&spec).await {
                Ok(process) => {
                    tracing::info!(
                        "Player started in mode {} (pid {:?})",
                        spec.mode,
                        process.id()
                    );
                    self.process = Some(process);
                    return Ok(());
                }
                Err(e) if e.is_mode_failure() => {
                    tracing::warn!("{}, trying next mode", e);
                    tried.push(spec.mode);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!("Failed to start player in all modes: {:?}", tried);
        Err(Error::AllModesFailed { modes: tried })
    }

    /// Launch one profile and judge it.
    async fn launch(&self, spec: &LaunchSpec) -> Result<PlayerProcess> {
        remove_stale_endpoint(&self.config.ipc_path);
        remove_file_if_exists(&spec.log_file);

        let mut process = PlayerProcess::spawn(&self.config.program, spec)?;
        tokio::time::sleep(spec.settle).await;

        if let Some(status) = process.exit_status() {
            return Err(Error::EarlyExit {
                mode: spec.mode.clone(),
                status: status.to_string(),
            });
        }

        match self.signatures.scan_file(process.log_file()) {
            Ok(None) => Ok(process),
            Ok(Some(signature)) => {
                self.terminate(process).await;
                Err(Error::DriverFailure {
                    mode: spec.mode.clone(),
                    signature,
                })
            }
            Err(e) => {
                tracing::debug!("Could not read player log {:?}: {}", spec.log_file, e);
                Ok(process)
            }
        }
    }

    /// Stop the player: quit over IPC, bounded wait, then kill. The handle is
    /// cleared whatever happens.
    pub async fn stop(&mut self) {
        if let Some(process) = self.process.take() {
            tracing::info!("Stopping player ({})", process.mode());
            self.terminate(process).await;
        }
    }

    async fn terminate(&self, mut process: PlayerProcess) {
        if !process.is_running() {
            return;
        }

        if self.channel.request(&Command::Quit, false).await.is_none() {
            tracing::debug!("Player did not accept quit, waiting before kill");
        }
        process.wait_or_kill(self.config.quit_timeout()).await;
    }
}

/// A crashed player leaves its socket file behind, and a fresh player cannot
/// bind over it. Named pipes vanish with their server, so this is Unix-only.
fn remove_stale_endpoint(path: &Path) {
    if cfg!(unix) {
        remove_file_if_exists(path);
    }
}

fn remove_file_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed stale {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
    }
}
