//! Typed ID wrappers.
//!
//! The authority keys videos by an auto-increment integer. Wrapping it keeps a
//! video id from being confused with a playlist position or cursor value.

use serde::{Deserialize, Serialize};

/// Identifier of a video in the authority's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(i64);

impl VideoId {
    /// Wrap a raw catalog id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<VideoId> for i64 {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl std::str::FromStr for VideoId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| crate::Error::invalid_input(format!("invalid video id: {s:?}")))
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
