//! Local media cache.
//!
//! The cache directory mirrors the authority's catalog: every declared file
//! is downloaded if missing, and every regular file that is no longer
//! declared is deleted. Files already present are never re-downloaded.

use crate::authority::AuthorityClient;
use anyhow::{Context, Result};
use signage_common::paths::{is_partial_download, is_safe_cache_name, partial_name};
use signage_common::VideoMeta;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// What one synchronization pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub downloaded: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
    /// Catalog names refused as cache keys.
    pub rejected: Vec<String>,
}

impl SyncReport {
    /// Whether a new file became available. A play that failed on a missing
    /// file may succeed now.
    pub fn changed(&self) -> bool {
        !self.downloaded.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MediaCache {
    dir: PathBuf,
}

impl MediaCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of a cached file.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Names of the regular files currently in the cache.
    pub async fn local_files(&self) -> Result<BTreeSet<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read cache directory {:?}", self.dir))?;

        let mut names = BTreeSet::new();
        while let Some(entry) = entries.next_entry().await? {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => {
                    names.insert(name);
                }
                Err(name) => tracing::debug!("Ignoring non UTF-8 cache entry {:?}", name),
            }
        }
        Ok(names)
    }

    /// Bring the cache in line with `catalog`.
    ///
    /// Individual download and delete failures are recorded and logged; only
    /// an unusable cache directory fails the pass.
    pub async fn sync(
        &self,
        authority: &AuthorityClient,
        catalog: &[VideoMeta],
    ) -> Result<SyncReport> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create cache directory {:?}", self.dir))?;

        let local = self.local_files().await?;
        let mut report = SyncReport::default();

        let mut declared = BTreeSet::new();
        for video in catalog {
            if is_safe_cache_name(&video.filename) {
                declared.insert(video.filename.as_str());
            } else if !report.rejected.contains(&video.filename) {
                tracing::warn!("Refusing unsafe media name {:?} (id {})", video.filename, video.id);
                report.rejected.push(video.filename.clone());
            }
        }

        for name in declared.iter().filter(|n| !local.contains(**n)) {
            match self.fetch(authority, name).await {
                Ok(bytes) => {
                    tracing::info!("Downloaded {} ({} bytes)", name, bytes);
                    report.downloaded.push(name.to_string());
                }
                Err(e) => {
                    tracing::warn!("Failed to download {}: {:#}", name, e);
                    report.failed.push(name.to_string());
                }
            }
        }

        for name in local.iter().filter(|n| !declared.contains(n.as_str())) {
            match tokio::fs::remove_file(self.path_for(name)).await {
                Ok(()) => {
                    if is_partial_download(name) {
                        tracing::info!("Discarded interrupted download {}", name);
                    } else {
                        tracing::info!("Deleted unused media {}", name);
                    }
                    report.removed.push(name.clone());
                }
                Err(e) => tracing::debug!("Failed to delete {}: {}", name, e),
            }
        }

        Ok(report)
    }

    /// Download into a hidden part file and rename it into place once the
    /// body is complete.
    async fn fetch(&self, authority: &AuthorityClient, name: &str) -> Result<u64> {
        let part = self.path_for(&partial_name(name));
        let target = self.path_for(name);

        let result = match authority.download(name, &part).await {
            Ok(bytes) => tokio::fs::rename(&part, &target)
                .await
                .map(|()| bytes)
                .with_context(|| format!("Failed to move {:?} into place", part)),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&part).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!("Failed to remove {:?}: {}", part, e);
                }
            }
        }
        result
    }
}
