//! Signage agent - keeps a display's video playback in line with a central
//! authority.
//!
//! This library crate exposes the agent's building blocks for integration
//! testing.

pub mod agent;
pub mod authority;
pub mod cache;
pub mod config;
