//! # signage-player
//!
//! Supervision and control of an external mpv process for unattended
//! signage playback.
//!
//! This crate provides:
//! - A [`Supervisor`] that starts the player through an ordered hardware
//!   fallback (`gpu-fast`, `gpu-safe`, `drm`), rejecting profiles that exit
//!   early or log a fatal driver error, and that always reaps what it spawns
//! - An [`IpcChannel`] speaking mpv's newline-delimited JSON protocol with
//!   bounded, retried delivery
//! - A [`Player`] facade implementing [`Playback`]: play, pause, rotate,
//!   idle queries, and stop
//!
//! ## Example
//!
//! ```no_run
//! use signage_common::Rotation;
//! use signage_player::{Playback, Player, PlayerConfig};
//! use std::path::Path;
//!
//! # async fn example() {
//! let mut player = Player::new(PlayerConfig::default());
//! player
//!     .play(Path::new("/srv/videos/lobby.mp4"), Rotation::from_degrees(90), true)
//!     .await;
//! assert!(player.is_playing().await);
//! player.stop().await;
//! # }
//! ```

mod config;
mod error;
pub mod ipc;
mod player;
pub mod supervisor;
pub mod template;
pub mod tools;

// Re-exports
pub use config::{HardwareProfile, LaunchSpec, LaunchStrategy, PlayerConfig};
pub use error::{Error, Result};
pub use ipc::{Command, IpcChannel, Property, Reply, RetryPolicy};
pub use player::{Playback, Player, PlayerState};
pub use supervisor::{FailureSignatures, PlayerProcess, Supervisor};
pub use template::TemplateContext;
pub use tools::{check_tool, require_tool, MpvVersion, PlayerTool};
