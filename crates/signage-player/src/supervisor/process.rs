//! Owned handle to a running player process.

use crate::config::LaunchSpec;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// A spawned player process.
///
/// The child is spawned with `kill_on_drop`, so dropping the handle on any
/// path (failed mode, cancelled future, supervisor drop) never leaks a player.
#[derive(Debug)]
pub struct PlayerProcess {
    child: Child,
    mode: String,
    log_file: PathBuf,
}

impl PlayerProcess {
    /// Spawn `program` with the arguments of `spec`.
    pub fn spawn(program: &str, spec: &LaunchSpec) -> Result<Self> {
        tracing::info!(
            "Starting player process ({}): {} {}",
            spec.mode,
            program,
            spec.args.join(" ")
        );

        let child = Command::new(program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::spawn(program, e))?;

        Ok(Self {
            child,
            mode: spec.mode.clone(),
            log_file: spec.log_file.clone(),
        })
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking liveness poll. `Some` once the process has exited.
    pub fn exit_status(&mut self) -> Option<ExitStatus> {
        match self.child.try_wait() {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Failed to poll player process: {}", e);
                None
            }
        }
    }

    pub fn is_running(&mut self) -> bool {
        self.exit_status().is_none()
    }

    /// Wait up to `timeout` for the process to exit on its own, then kill it.
    pub async fn wait_or_kill(mut self, timeout: std::time::Duration) {
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!("Player ({}) exited with {}", self.mode, status);
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed waiting for player ({}): {}", self.mode, e);
                self.kill().await;
            }
            Err(_) => {
                tracing::warn!(
                    "Player ({}) did not exit within {:?}, killing",
                    self.mode,
                    timeout
                );
                self.kill().await;
            }
        }
    }

    async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("Failed to kill player ({}): {}", self.mode, e);
        }
    }
}
