//! Player program detection.
//!
//! The agent drives mpv over its JSON IPC server, which older builds lack.
//! `mpv --version` prints a banner such as `mpv 0.37.0 Copyright © ...`; the
//! version is read from it so an unusable build is reported before launch.

use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// Release number parsed from an mpv version banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MpvVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl MpvVersion {
    /// Oldest mpv release with `--input-ipc-server`.
    pub const MIN_JSON_IPC: MpvVersion = MpvVersion {
        major: 0,
        minor: 17,
        patch: 0,
    };

    /// Parse the first line of `mpv --version`.
    ///
    /// Accepts release builds (`mpv 0.37.0`) and tagged git builds
    /// (`mpv v0.36.0-594-g4d3d7e4b3f`). Untagged builds carry only a commit
    /// hash and yield `None`.
    ///
    /// ```
    /// use signage_player::MpvVersion;
    ///
    /// let v = MpvVersion::parse_banner("mpv 0.37.0 Copyright © 2000-2023 mpv/MPlayer/mplayer2 projects").unwrap();
    /// assert_eq!((v.major, v.minor, v.patch), (0, 37, 0));
    /// ```
    pub fn parse_banner(banner: &str) -> Option<Self> {
        let mut words = banner.split_whitespace();
        if words.next()? != "mpv" {
            return None;
        }
        let release = words.next()?;
        let release = release.strip_prefix('v').unwrap_or(release);
        let numeric = release
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()?;

        let mut parts = numeric.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    /// Whether this release has the JSON IPC server the agent talks to.
    pub fn supports_json_ipc(&self) -> bool {
        *self >= Self::MIN_JSON_IPC
    }
}

impl fmt::Display for MpvVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What was found for the configured player program.
#[derive(Debug, Clone)]
pub struct PlayerTool {
    /// Program name as configured.
    pub program: String,
    /// Resolved executable, if it is on PATH.
    pub path: Option<PathBuf>,
    /// First line of `--version` output.
    pub banner: Option<String>,
    /// Release parsed from the banner.
    pub version: Option<MpvVersion>,
}

impl PlayerTool {
    /// The program exists and answered `--version`.
    pub fn available(&self) -> bool {
        self.path.is_some() && self.banner.is_some()
    }

    /// Whether the player is known to lack JSON IPC. An unparsable banner is
    /// given the benefit of the doubt.
    pub fn too_old(&self) -> bool {
        self.version.is_some_and(|v| !v.supports_json_ipc())
    }
}

/// Locate the player program and read its version banner.
///
/// # Example
///
/// ```no_run
/// use signage_player::check_tool;
///
/// let tool = check_tool("mpv");
/// if let Some(version) = tool.version {
///     println!("mpv {}", version);
/// }
/// ```
pub fn check_tool(program: &str) -> PlayerTool {
    let path = which::which(program).ok();

    let banner = path.as_ref().and_then(|path| {
        let output = Command::new(path).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|line| line.trim().to_string())
    });

    let version = banner.as_deref().and_then(MpvVersion::parse_banner);

    PlayerTool {
        program: program.to_string(),
        path,
        banner,
        version,
    }
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}
