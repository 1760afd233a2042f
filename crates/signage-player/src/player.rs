//! Typed playback commands on top of the supervisor and message channel.

use crate::config::PlayerConfig;
use crate::ipc::{Command, IpcChannel, Property, Reply};
use crate::supervisor::Supervisor;
use crate::Result;
use serde_json::Value;
use signage_common::Rotation;
use std::path::{Path, PathBuf};

/// Last state the player acknowledged. May lag reality when a command was
/// lost; the agent re-derives what to send from declared state every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub media: Option<PathBuf>,
    pub rotation: Rotation,
    pub paused: bool,
    pub looping: bool,
    /// Loop mode the player has not acknowledged yet. Re-sent until it is.
    pub pending_loop: Option<bool>,
}

/// The playback operations the reconciliation loop relies on.
///
/// Mutating operations are best-effort: they report whether the player
/// acknowledged, and never fail the caller.
#[async_trait::async_trait]
pub trait Playback: Send {
    /// Replace the current file, then apply rotation and loop mode.
    async fn play(&mut self, path: &Path, rotation: Rotation, looping: bool) -> bool;

    async fn set_pause(&mut self, paused: bool) -> bool;

    async fn set_rotation(&mut self, rotation: Rotation) -> bool;

    /// Last acknowledged rotation.
    fn rotation(&self) -> Rotation;

    /// Alive and has a file loaded. A dead player is never playing.
    async fn is_playing(&mut self) -> bool;

    async fn stop(&mut self);
}

/// mpv driven over JSON IPC.
#[derive(Debug)]
pub struct Player {
    supervisor: Supervisor,
    channel: IpcChannel,
    state: PlayerState,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        let channel = IpcChannel::new(config.ipc_path.clone(), config.ipc);
        Self {
            supervisor: Supervisor::new(config),
            channel,
            state: PlayerState::default(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn active_mode(&self) -> Option<&str> {
        self.supervisor.active_mode()
    }

    pub fn ipc_path(&self) -> &Path {
        self.supervisor.ipc_path()
    }

    pub fn is_alive(&mut self) -> bool {
        self.supervisor.is_alive()
    }

    /// Start the player if it is not running.
    pub async fn start(&mut self) -> Result<()> {
        self.supervisor.start().await
    }

    async fn send(&mut self, command: Command, expect_reply: bool) -> Option<Reply> {
        if let Err(e) = self.supervisor.start().await {
            tracing::warn!("Cannot send {}: {}", command.name(), e);
            return None;
        }
        self.channel.request(&command, expect_reply).await
    }

    /// Send and wait for the player's acknowledgement.
    async fn send_ok(&mut self, command: Command) -> bool {
        self.send(command, true)
            .await
            .is_some_and(|reply| reply.is_success())
    }

    /// Read a property. `None` when the player did not answer or refused.
    pub async fn get_property(&mut self, property: Property) -> Option<Value> {
        self.send(Command::GetProperty(property), true)
            .await
            .and_then(Reply::into_data)
    }

    /// `true` only when the player affirms it has no active file.
    pub async fn query_idle(&mut self) -> bool {
        self.get_property(Property::IdleActive).await == Some(Value::Bool(true))
    }

    /// Rotation as the player currently reports it.
    pub async fn query_rotation(&mut self) -> Option<Rotation> {
        match self.get_property(Property::VideoRotate).await? {
            Value::Number(n) => n.as_i64().map(Rotation::from_degrees),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    async fn set_loop(&mut self, looping: bool) -> bool {
        let ok = self.send_ok(Command::set_loop(looping)).await;
        if ok {
            self.state.looping = looping;
            self.state.pending_loop = None;
        } else {
            tracing::debug!("Loop mode {} not acknowledged, will retry", looping);
            self.state.pending_loop = Some(looping);
        }
        ok
    }

    pub async fn version(&mut self) -> Option<String> {
        match self.get_property(Property::MpvVersion).await? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl Playback for Player {
    async fn play(&mut self, path: &Path, rotation: Rotation, looping: bool) -> bool {
        if !self.send_ok(Command::load(path)).await {
            tracing::warn!("Player did not accept {:?}", path);
            return false;
        }

        self.state.media = Some(path.to_path_buf());
        self.state.paused = false;

        // A file is loaded either way; a refused rotation or loop mode is
        // corrected on later cycles.
        self.set_rotation(rotation).await;
        self.set_loop(looping).await;
        true
    }

    async fn set_pause(&mut self, paused: bool) -> bool {
        let ok = self.send_ok(Command::set_pause(paused)).await;
        if ok {
            self.state.paused = paused;
        }
        ok
    }

    async fn set_rotation(&mut self, rotation: Rotation) -> bool {
        let ok = self.send_ok(Command::set_rotation(rotation)).await;
        if ok {
            self.state.rotation = rotation;
        }
        ok
    }

    fn rotation(&self) -> Rotation {
        self.state.rotation
    }

    async fn is_playing(&mut self) -> bool {
        if !self.supervisor.is_alive() {
            return false;
        }
        // A track stuck on loop-file=inf would never go idle.
        if let Some(looping) = self.state.pending_loop {
            self.set_loop(looping).await;
        }
        !self.query_idle().await
    }

    async fn stop(&mut self) {
        self.supervisor.stop().await;
        self.state.media = None;
        self.state.pending_loop = None;
    }
}
