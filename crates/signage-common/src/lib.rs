//! Signage-Common: Shared types and utilities.
//!
//! This crate provides the data model shared by the signage agent and its
//! player driver:
//!
//! - **Typed IDs**: [`VideoId`] wraps the authority's integer video key
//! - **Core Types**: playback mode, rotation, video metadata, and the manifest
//!   the authority publishes each poll
//! - **Path Utilities**: validation of cache file names received over the wire
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use signage_common::{Manifest, PlaybackMode, VideoId};
//!
//! let manifest: Manifest = serde_json::from_str(r#"{
//!     "mode": "single",
//!     "current_single_id": "5",
//!     "all_videos": [{"id": 5, "filename": "a.mp4", "rotation": 90}]
//! }"#).unwrap();
//!
//! assert_eq!(manifest.mode, PlaybackMode::Single);
//! assert_eq!(manifest.current_single_id, Some(VideoId::new(5)));
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
