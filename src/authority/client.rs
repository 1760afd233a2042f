use crate::config::AuthorityConfig;
use anyhow::{Context, Result};
use reqwest::{Client, Url};
use signage_common::{Manifest, StatusReport};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// HTTP client for the authority's three endpoints.
pub struct AuthorityClient {
    client: Client,
    base_url: String,
    manifest_timeout: Duration,
    status_timeout: Duration,
}

impl AuthorityClient {
    pub fn new(config: &AuthorityConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            manifest_timeout: config.manifest_timeout(),
            status_timeout: config.status_timeout(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Download URL of a catalog file. The name is sent as one encoded path
    /// segment.
    pub fn media_url(&self, filename: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid authority url: {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Authority url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(["static", "videos", filename]);

        Ok(url)
    }

    /// Fetch the declared configuration.
    pub async fn fetch_manifest(&self) -> Result<Manifest> {
        let response = self
            .client
            .get(self.url("/api/manifest"))
            .timeout(self.manifest_timeout)
            .send()
            .await
            .context("Failed to fetch manifest")?;

        if !response.status().is_success() {
            anyhow::bail!("Manifest request failed ({})", response.status());
        }

        response
            .json::<Manifest>()
            .await
            .context("Failed to decode manifest")
    }

    /// Push a heartbeat.
    pub async fn report_status(&self, report: &StatusReport) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/status"))
            .timeout(self.status_timeout)
            .json(report)
            .send()
            .await
            .context("Failed to send status")?;

        if !response.status().is_success() {
            anyhow::bail!("Status report rejected ({})", response.status());
        }
        Ok(())
    }

    /// Stream `filename` into `dest` chunk by chunk, returning the bytes
    /// written. On error `dest` may hold a partial body.
    pub async fn download(&self, filename: &str, dest: &Path) -> Result<u64> {
        let url = self.media_url(filename)?;
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", filename))?;

        if !response.status().is_success() {
            anyhow::bail!("Download of {} failed ({})", filename, response.status());
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {:?}", dest))?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed reading body of {}", filename))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {:?}", dest))?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}
