use serde::{Deserialize, Serialize};
use signage_player::PlayerConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub authority: AuthorityConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub player: PlayerConfig,
}

/// Where the declared configuration comes from and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorityConfig {
    /// Base URL of the authority, e.g. `http://192.168.1.10:5000`
    #[serde(default = "default_authority_url")]
    pub url: String,

    /// Timeout for fetching the manifest
    #[serde(default = "default_manifest_timeout_ms")]
    pub manifest_timeout_ms: u64,

    /// Timeout for pushing a status report
    #[serde(default = "default_status_timeout_ms")]
    pub status_timeout_ms: u64,

    /// TCP connect timeout, shared by all requests including downloads
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_authority_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_manifest_timeout_ms() -> u64 {
    2000
}

fn default_status_timeout_ms() -> u64 {
    1000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            url: default_authority_url(),
            manifest_timeout_ms: default_manifest_timeout_ms(),
            status_timeout_ms: default_status_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl AuthorityConfig {
    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_millis(self.manifest_timeout_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Sleep between reconciliation cycles
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Local media cache directory
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./videos")
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl AgentConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
