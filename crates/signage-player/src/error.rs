//! Error types for signage-player.

use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while supervising or talking to the player.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The player process could not be spawned.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The player exited before the settle interval elapsed.
    #[error("player exited during startup in mode {mode} ({status})")]
    EarlyExit { mode: String, status: String },

    /// The player is alive but its log shows a fatal driver error.
    #[error("player reported a driver failure in mode {mode}: {signature}")]
    DriverFailure { mode: String, signature: String },

    /// Every launch profile failed.
    #[error("player failed to start in all modes ({})", modes.join(", "))]
    AllModesFailed { modes: Vec<String> },

    /// An IPC exchange did not complete in time.
    #[error("IPC timed out after {0:?}")]
    Timeout(Duration),

    /// The player sent something that is not a valid reply frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a spawn error.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Whether this error means a launch profile was rejected, as opposed to
    /// the whole start sequence failing.
    pub fn is_mode_failure(&self) -> bool {
        matches!(
            self,
            Self::Spawn { .. } | Self::EarlyExit { .. } | Self::DriverFailure { .. }
        )
    }
}
