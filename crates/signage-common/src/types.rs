//! Core type definitions for the authority's declared configuration.
//!
//! The authority publishes a manifest on every poll. Its JSON shape is loose
//! (ids arrive as numbers or strings, the restart token as a string or a
//! number), so the deserializers here normalize it into strict types once, at
//! the edge, and the rest of the agent never sees the raw form.

use crate::ids::VideoId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Label reported to the authority when nothing is playing.
pub const STOPPED_LABEL: &str = "Stopped";

/// Restart token value the authority uses before any restart was requested.
const RESTART_SENTINEL: &str = "0";

/// Playback mode declared by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Loop one video indefinitely.
    #[default]
    Single,
    /// Play the playlist in order, wrapping at the end.
    Playlist,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Playlist => write!(f, "playlist"),
        }
    }
}

/// Clockwise video rotation in degrees, normalized to `0..360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Rotation(u16);

impl Rotation {
    /// No rotation.
    pub const NONE: Rotation = Rotation(0);

    /// Build a rotation from any integer degree value.
    ///
    /// ```
    /// use signage_common::Rotation;
    ///
    /// assert_eq!(Rotation::from_degrees(450).degrees(), 90);
    /// assert_eq!(Rotation::from_degrees(-90).degrees(), 270);
    /// ```
    #[must_use]
    pub fn from_degrees(degrees: i64) -> Self {
        Self(degrees.rem_euclid(360) as u16)
    }

    /// Degrees in `0..360`.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.0
    }
}

impl std::str::FromStr for Rotation {
    type Err = crate::Error;

    /// Parse an integer degree value, as the authority and the player both
    /// send it as text at times.
    fn from_str(s: &str) -> crate::Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self::from_degrees)
            .map_err(|_| crate::Error::invalid_input(format!("invalid rotation: {s:?}")))
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(Self::NONE),
            Some(Raw::Int(v)) => Ok(Self::from_degrees(v)),
            Some(Raw::Float(v)) => Ok(Self::from_degrees(v.round() as i64)),
            Some(Raw::Text(s)) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Metadata for one video in the authority's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMeta {
    /// Stable catalog id.
    pub id: VideoId,
    /// Cache key on disk and download name on the authority.
    pub filename: String,
    /// Rotation the video should be shown at.
    #[serde(default)]
    pub rotation: Rotation,
}

/// One playlist slot. Only the id is authoritative; the catalog supplies the
/// rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: VideoId,
}

/// The authority's declared playback configuration, fetched fresh each poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub mode: PlaybackMode,

    /// Target of [`PlaybackMode::Single`]. Null, empty, or non-numeric values
    /// mean "no target".
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub current_single_id: Option<VideoId>,

    #[serde(default)]
    pub paused: bool,

    /// Opaque restart token. `None` is the authority's "never restarted"
    /// value.
    #[serde(
        default,
        rename = "restart_id",
        deserialize_with = "deserialize_restart_token"
    )]
    pub restart_token: Option<String>,

    /// Ordered playlist; duplicates allowed.
    #[serde(default)]
    pub playlist: Vec<PlaylistEntry>,

    /// Every video the device should have cached.
    #[serde(default)]
    pub all_videos: Vec<VideoMeta>,

    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl Manifest {
    /// Index the catalog by id.
    pub fn catalog(&self) -> HashMap<VideoId, &VideoMeta> {
        self.all_videos.iter().map(|v| (v.id, v)).collect()
    }

    /// Look up a single video by id.
    pub fn video(&self, id: VideoId) -> Option<&VideoMeta> {
        self.all_videos.iter().find(|v| v.id == id)
    }

    /// The catalog entry for the declared single target, if it resolves.
    pub fn single_target(&self) -> Option<&VideoMeta> {
        self.current_single_id.and_then(|id| self.video(id))
    }

    /// Playlist entries resolved against the catalog, in playback order.
    ///
    /// Entries whose id is not in the catalog are dropped.
    pub fn resolved_playlist(&self) -> Vec<&VideoMeta> {
        let catalog = self.catalog();
        self.playlist
            .iter()
            .filter_map(|entry| catalog.get(&entry.id).copied())
            .collect()
    }
}

/// Heartbeat body pushed to the authority after each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub current_video: String,
}

impl StatusReport {
    /// Report a playing file.
    pub fn playing(filename: impl Into<String>) -> Self {
        Self {
            current_video: filename.into(),
        }
    }

    /// Report that nothing is playing.
    pub fn stopped() -> Self {
        Self::playing(STOPPED_LABEL)
    }

    pub fn is_stopped(&self) -> bool {
        self.current_video == STOPPED_LABEL
    }
}

fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<VideoId>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(v)) => Some(VideoId::new(v)),
        Some(Raw::Text(s)) => s.parse().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}

fn deserialize_restart_token<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let token = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s.trim().to_string(),
        Some(Raw::Int(v)) => v.to_string(),
        Some(Raw::Float(v)) => v.to_string(),
        None => return Ok(None),
    };

    if token.is_empty() || token == RESTART_SENTINEL {
        Ok(None)
    } else {
        Ok(Some(token))
    }
}
