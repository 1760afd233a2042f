//! Connection handling for the player's IPC endpoint.
//!
//! Every attempt opens a fresh connection, writes one frame, optionally reads
//! one reply, and closes. Nothing is pooled, so a player restart between two
//! commands never leaves a dead connection behind.

use super::protocol::{Command, Frame, Reply};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Retry policy for one command delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per command.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Bound on connect + write + read for a single attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause after a failed attempt.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_attempts() -> u32 {
    3
}
fn default_timeout_ms() -> u64 {
    1500
}
fn default_backoff_ms() -> u64 {
    500
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            timeout_ms: default_timeout_ms(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Message channel to a single local player endpoint.
#[derive(Debug, Clone)]
pub struct IpcChannel {
    endpoint: PathBuf,
    policy: RetryPolicy,
}

impl IpcChannel {
    pub fn new(endpoint: impl Into<PathBuf>, policy: RetryPolicy) -> Self {
        Self {
            endpoint: endpoint.into(),
            policy,
        }
    }

    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deliver `command`, retrying per the policy.
    ///
    /// Returns `None` when every attempt failed. Never errors: callers treat a
    /// missing reply as "not applied" and re-evaluate later.
    pub async fn request(&self, command: &Command, expect_reply: bool) -> Option<Reply> {
        let frame = match command.encode() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to encode {} command: {}", command.name(), e);
                return None;
            }
        };

        let attempts = self.policy.attempts.max(1);
        for attempt in 1..=attempts {
            match self.attempt(&frame, expect_reply).await {
                Ok(reply) => return Some(reply),
                Err(e) => {
                    tracing::debug!(
                        "IPC attempt {}/{} for {} failed: {}",
                        attempt,
                        attempts,
                        command.name(),
                        e
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.backoff()).await;
                    }
                }
            }
        }

        tracing::debug!(
            "No response from player for {} after {} attempts",
            command.name(),
            attempts
        );
        None
    }

    async fn attempt(&self, frame: &[u8], expect_reply: bool) -> Result<Reply> {
        let timeout = self.policy.timeout();
        tokio::time::timeout(timeout, self.connect_and_exchange(frame, expect_reply))
            .await
            .map_err(|_| Error::Timeout(timeout))?
    }

    async fn connect_and_exchange(&self, frame: &[u8], expect_reply: bool) -> Result<Reply> {
        let stream = connect(&self.endpoint).await?;
        exchange(stream, frame, expect_reply).await
    }
}

/// Write one frame and, when asked, read frames until a reply arrives.
async fn exchange<S>(stream: S, frame: &[u8], expect_reply: bool) -> Result<Reply>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    stream.write_all(frame).await?;
    stream.flush().await?;

    if !expect_reply {
        return Ok(Reply::accepted());
    }

    let mut line = String::new();
    loop {
        line.clear();
        if stream.read_line(&mut line).await? == 0 {
            return Err(Error::protocol("connection closed before reply"));
        }
        if line.trim().is_empty() {
            continue;
        }
        match Frame::decode(&line)? {
            Frame::Reply(reply) => return Ok(reply),
            Frame::Event(event) => tracing::trace!("Skipping player event: {}", event),
        }
    }
}

#[cfg(unix)]
async fn connect(endpoint: &Path) -> std::io::Result<tokio::net::UnixStream> {
    tokio::net::UnixStream::connect(endpoint).await
}

#[cfg(windows)]
async fn connect(
    endpoint: &Path,
) -> std::io::Result<tokio::net::windows::named_pipe::NamedPipeClient> {
    tokio::net::windows::named_pipe::ClientOptions::new().open(endpoint)
}
