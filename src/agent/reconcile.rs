//! One reconciliation pass: compare the declared configuration against
//! [`ReconciliationMemory`] and issue the smallest set of playback commands
//! that closes the gap.

use super::memory::{AppliedMode, ReconciliationMemory};
use crate::cache::MediaCache;
use signage_common::{Manifest, PlaybackMode, StatusReport, VideoMeta};
use signage_player::Playback;

pub struct Reconciler {
    media: MediaCache,
    memory: ReconciliationMemory,
}

impl Reconciler {
    pub fn new(media: MediaCache) -> Self {
        Self {
            media,
            memory: ReconciliationMemory::default(),
        }
    }

    pub fn memory(&self) -> &ReconciliationMemory {
        &self.memory
    }

    /// Hard-stop the player if the authority issued a new restart token.
    /// Returns whether the player was stopped.
    pub async fn check_restart<P>(&mut self, manifest: &Manifest, player: &mut P) -> bool
    where
        P: Playback + ?Sized,
    {
        if !self.memory.restart.observe(manifest.restart_token.as_deref()) {
            return false;
        }

        tracing::info!(
            "Restart requested (token {:?}), stopping player",
            manifest.restart_token
        );
        player.stop().await;
        self.memory.now_playing = None;
        true
    }

    /// Apply the pause flag and the declared mode.
    pub async fn apply<P>(&mut self, manifest: &Manifest, player: &mut P)
    where
        P: Playback + ?Sized,
    {
        if manifest.paused != self.memory.applied_pause {
            tracing::info!("{} playback", if manifest.paused { "Pausing" } else { "Resuming" });
            player.set_pause(manifest.paused).await;
            self.memory.applied_pause = manifest.paused;
        }

        match manifest.mode {
            PlaybackMode::Single => self.apply_single(manifest, player).await,
            PlaybackMode::Playlist => self.apply_playlist(manifest, player).await,
        }
    }

    async fn apply_single<P>(&mut self, manifest: &Manifest, player: &mut P)
    where
        P: Playback + ?Sized,
    {
        let Some(target) = manifest.single_target() else {
            tracing::trace!(
                "Single target {:?} not in catalog, leaving playback as is",
                manifest.current_single_id
            );
            return;
        };

        let switching = self.memory.applied_mode != AppliedMode::Single
            || self.memory.applied_single_id != Some(target.id);

        if switching {
            tracing::info!("Switching to single video {} ({})", target.id, target.filename);
            self.play(player, target, true).await;
            self.memory.applied_mode = AppliedMode::Single;
            self.memory.applied_single_id = Some(target.id);
        } else if player.rotation() != target.rotation {
            tracing::info!("Rotating {} to {}", target.filename, target.rotation);
            player.set_rotation(target.rotation).await;
        } else if !manifest.paused && !player.is_playing().await {
            tracing::info!("Player idle, restarting {}", target.filename);
            self.play(player, target, true).await;
        }
    }

    async fn apply_playlist<P>(&mut self, manifest: &Manifest, player: &mut P)
    where
        P: Playback + ?Sized,
    {
        let tracks = manifest.resolved_playlist();

        if tracks.is_empty() {
            if self.memory.now_playing.is_some()
                || self.memory.applied_mode != AppliedMode::Playlist
            {
                tracing::info!("Playlist is empty, stopping player");
            }
            player.stop().await;
            self.memory.applied_mode = AppliedMode::Playlist;
            self.memory.now_playing = None;
            return;
        }

        if self.memory.applied_mode != AppliedMode::Playlist {
            tracing::info!("Switching to playlist ({} tracks)", tracks.len());
            self.memory.applied_mode = AppliedMode::Playlist;
            self.memory.cursor.reset();
            self.advance(player, &tracks).await;
        } else if !manifest.paused && !player.is_playing().await {
            self.advance(player, &tracks).await;
        }
    }

    /// Play the track under the cursor, then move the cursor on.
    async fn advance<P>(&mut self, player: &mut P, tracks: &[&VideoMeta])
    where
        P: Playback + ?Sized,
    {
        let Some(slot) = self.memory.cursor.index(tracks.len()) else {
            return;
        };
        let track = tracks[slot];

        tracing::info!(
            "Playlist track {}/{}: {}",
            slot + 1,
            tracks.len(),
            track.filename
        );
        self.play(player, track, false).await;
        self.memory.cursor.advance();
    }

    async fn play<P>(&mut self, player: &mut P, video: &VideoMeta, looping: bool) -> bool
    where
        P: Playback + ?Sized,
    {
        let path = self.media.path_for(&video.filename);
        let accepted = player.play(&path, video.rotation, looping).await;
        if !accepted {
            tracing::warn!("Play of {} was not acknowledged", video.filename);
        }
        self.memory.now_playing = accepted.then(|| video.filename.clone());
        accepted
    }

    /// What to report as currently playing.
    pub async fn status<P>(&self, player: &mut P) -> StatusReport
    where
        P: Playback + ?Sized,
    {
        match &self.memory.now_playing {
            Some(name) if player.is_playing().await => StatusReport::playing(name.clone()),
            _ => StatusReport::stopped(),
        }
    }
}
