//! The reconciliation loop.
//!
//! Each cycle fetches the declared configuration, honours a restart request,
//! synchronizes the media cache, reconciles playback, and pushes a status
//! heartbeat. Cycles never fail the loop: errors are logged and the next
//! cycle starts from a fresh fetch.

mod memory;
mod reconcile;

pub use memory::{AppliedMode, PlaylistCursor, ReconciliationMemory, RestartTracker};
pub use reconcile::Reconciler;

use crate::authority::AuthorityClient;
use crate::cache::{MediaCache, SyncReport};
use crate::config::Config;
use anyhow::Result;
use signage_common::StatusReport;
use signage_player::Playback;
use std::time::Duration;
use tokio::sync::mpsc;

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The authority could not be reached; nothing was touched.
    Skipped,
    Reconciled {
        restarted: bool,
        sync: SyncReport,
        status: StatusReport,
    },
}

pub struct Agent<P> {
    authority: AuthorityClient,
    cache: MediaCache,
    reconciler: Reconciler,
    player: P,
    poll_interval: Duration,
}

impl<P: Playback> Agent<P> {
    pub fn new(config: &Config, player: P) -> Self {
        let cache = MediaCache::new(&config.agent.cache_dir);
        Self {
            authority: AuthorityClient::new(&config.authority),
            reconciler: Reconciler::new(cache.clone()),
            cache,
            player,
            poll_interval: config.agent.poll_interval(),
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn memory(&self) -> &ReconciliationMemory {
        self.reconciler.memory()
    }

    /// Run one reconciliation cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let manifest = match self.authority.fetch_manifest().await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Skipping cycle: {:#}", e);
                return Ok(CycleOutcome::Skipped);
            }
        };

        let restarted = self
            .reconciler
            .check_restart(&manifest, &mut self.player)
            .await;

        let sync = self.cache.sync(&self.authority, &manifest.all_videos).await?;
        if sync.changed() || !sync.removed.is_empty() {
            tracing::debug!(
                "Cache updated: {} downloaded, {} removed",
                sync.downloaded.len(),
                sync.removed.len()
            );
        }

        self.reconciler.apply(&manifest, &mut self.player).await;

        let status = self.reconciler.status(&mut self.player).await;
        if let Err(e) = self.authority.report_status(&status).await {
            tracing::debug!("Status report dropped: {:#}", e);
        }

        Ok(CycleOutcome::Reconciled {
            restarted,
            sync,
            status,
        })
    }

    /// Reconcile until a shutdown signal arrives, then stop the player.
    pub async fn run(mut self, mut shutdown_rx: mpsc::Receiver<()>) -> P {
        tracing::info!(
            "Agent started, polling {} every {:?}",
            self.authority.base_url(),
            self.poll_interval
        );

        loop {
            match self.run_cycle().await {
                Ok(outcome) => tracing::trace!("Cycle finished: {:?}", outcome),
                Err(e) => tracing::error!("Cycle failed: {:#}", e),
            }

            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    tracing::info!("Agent shutting down");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        self.player.stop().await;
        self.player
    }
}
