//! What the agent last applied to the player.
//!
//! Declared state is compared against this record, not against the player,
//! so a command is only re-sent when the declaration changes or the player
//! visibly stopped doing what it was told.

use signage_common::VideoId;

/// Playback mode the agent last acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppliedMode {
    /// Nothing applied yet. Any declared mode counts as a change.
    #[default]
    Uninitialized,
    Single,
    Playlist,
}

/// Position in the resolved playlist. Always taken modulo the current
/// playlist length, so it stays valid when the playlist shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaylistCursor(u64);

impl PlaylistCursor {
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Slot the cursor points at in a playlist of `len` tracks.
    pub fn index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.0 % len as u64) as usize)
    }

    pub fn position(&self) -> u64 {
        self.0
    }
}

/// Edge detector for the authority's restart token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestartTracker {
    last_seen: Option<String>,
}

impl RestartTracker {
    /// Record `token` and report whether it is a restart request.
    ///
    /// A restart fires when the token differs from the previously seen one,
    /// unless nothing had been seen yet: the first token only arms the
    /// tracker. `None` is the authority's "never restarted" value; it never
    /// fires and leaves the recorded token alone.
    pub fn observe(&mut self, token: Option<&str>) -> bool {
        let Some(token) = token else {
            return false;
        };
        let fired = self.last_seen.as_deref().is_some_and(|last| last != token);
        self.last_seen = Some(token.to_string());
        fired
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }
}

/// Everything the reconciliation loop remembers between cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationMemory {
    pub applied_mode: AppliedMode,
    pub applied_single_id: Option<VideoId>,
    pub cursor: PlaylistCursor,
    pub applied_pause: bool,
    pub restart: RestartTracker,
    /// File name of the last play the player acknowledged. Cleared whenever
    /// the player is stopped.
    pub now_playing: Option<String>,
}
