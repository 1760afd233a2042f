//! Player launch and IPC settings.
//!
//! Defaults reproduce a headless Raspberry Pi deployment: mpv rendering
//! straight to DRM/KMS on HDMI-A-1 with V4L2 hardware decode and HDMI audio.
//! Every argument list is a template (see [`TemplateContext`]).

use crate::ipc::RetryPolicy;
use crate::template::TemplateContext;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One named startup profile of the hardware fallback sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub name: String,

    /// Appended to `base_args` for this profile.
    #[serde(default)]
    pub args: Vec<String>,
}

impl HardwareProfile {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// How the supervisor picks launch profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStrategy {
    /// `Desktop` when a display server is available, `Fallback` otherwise.
    #[default]
    Auto,
    /// Ordered hardware fallback for headless DRM output.
    Fallback,
    /// Single windowed launch under a desktop compositor.
    Desktop,
}

impl LaunchStrategy {
    /// Resolve `Auto` against the current environment.
    pub fn resolve(self) -> LaunchStrategy {
        match self {
            Self::Auto if has_display() => Self::Desktop,
            Self::Auto => Self::Fallback,
            other => other,
        }
    }
}

fn has_display() -> bool {
    cfg!(windows)
        || std::env::var_os("DISPLAY").is_some()
        || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

/// Fully substituted launch of one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub mode: String,
    pub args: Vec<String>,
    pub log_file: PathBuf,
    pub settle: Duration,
}

/// Player settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Player executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// IPC endpoint (Unix socket path or Windows named pipe).
    #[serde(default = "default_ipc_path")]
    pub ipc_path: PathBuf,

    /// Directory for per-profile diagnostic logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default)]
    pub launch: LaunchStrategy,

    /// Wait after spawning a fallback profile before judging it.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Wait after spawning the desktop profile.
    #[serde(default = "default_desktop_settle_ms")]
    pub desktop_settle_ms: u64,

    /// Grace period for the player to exit after `quit` before it is killed.
    #[serde(default = "default_quit_timeout_ms")]
    pub quit_timeout_ms: u64,

    /// How much of the end of a profile log is scanned for failures.
    #[serde(default = "default_log_tail_bytes")]
    pub log_tail_bytes: u64,

    /// Arguments shared by every fallback profile.
    #[serde(default = "default_base_args")]
    pub base_args: Vec<String>,

    /// Arguments of the desktop launch.
    #[serde(default = "default_desktop_args")]
    pub desktop_args: Vec<String>,

    /// Fallback profiles in priority order.
    #[serde(default = "default_profiles")]
    pub profiles: Vec<HardwareProfile>,

    /// Log substrings that mark a running player as unusable.
    #[serde(default = "default_failure_signatures")]
    pub failure_signatures: Vec<String>,

    #[serde(default)]
    pub ipc: RetryPolicy,
}

fn default_program() -> String {
    "mpv".to_string()
}

fn default_ipc_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"\\.\pipe\mpv-signage")
    } else {
        PathBuf::from("/tmp/mpv-socket")
    }
}

fn default_log_dir() -> PathBuf {
    if cfg!(windows) {
        std::env::temp_dir()
    } else {
        PathBuf::from("/tmp")
    }
}

fn default_settle_ms() -> u64 {
    1000
}
fn default_desktop_settle_ms() -> u64 {
    3000
}
fn default_quit_timeout_ms() -> u64 {
    2000
}
fn default_log_tail_bytes() -> u64 {
    4000
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

fn default_base_args() -> Vec<String> {
    strings(&[
        "--idle",
        "--fs",
        "--input-ipc-server={ipc_path}",
        "--force-window=yes",
        "--no-terminal",
        // Headless DRM target
        "--drm-device=/dev/dri/card1",
        "--drm-connector=HDMI-A-1",
        "--drm-mode=1920x1080",
        "--drm-atomic=no",
        // No UI
        "--no-osc",
        "--osd-level=0",
        "--background=0.0/0.0/0.0",
        "--hwdec=v4l2m2m-copy",
        "--hwdec-codecs=h264,hevc",
        "--ao=alsa",
        "--audio-device=alsa/hdmi:CARD=vc4hdmi0,DEV=0",
        "--audio-channels=stereo",
        "--gapless-audio=yes",
        "--log-file={log_file}",
    ])
}

fn default_desktop_args() -> Vec<String> {
    strings(&[
        "--idle",
        "--fs",
        "--input-ipc-server={ipc_path}",
        "--force-window=yes",
        "--background=000000",
        "--osd-level=0",
        "--no-terminal",
        "--hwdec=auto",
        "--log-file={log_file}",
    ])
}

fn default_profiles() -> Vec<HardwareProfile> {
    vec![
        HardwareProfile::new("gpu-fast", &["--vo=gpu", "--gpu-context=drm"]),
        HardwareProfile::new(
            "gpu-safe",
            &["--vo=gpu", "--gpu-context=drm", "--gpu-dumb-mode=yes"],
        ),
        HardwareProfile::new("drm", &["--vo=drm"]),
    ]
}

fn default_failure_signatures() -> Vec<String> {
    strings(&[
        "Failed to commit atomic request",
        "failed to set mode",
        "Permission denied",
        "No connected connectors found",
    ])
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            ipc_path: default_ipc_path(),
            log_dir: default_log_dir(),
            launch: LaunchStrategy::default(),
            settle_ms: default_settle_ms(),
            desktop_settle_ms: default_desktop_settle_ms(),
            quit_timeout_ms: default_quit_timeout_ms(),
            log_tail_bytes: default_log_tail_bytes(),
            base_args: default_base_args(),
            desktop_args: default_desktop_args(),
            profiles: default_profiles(),
            failure_signatures: default_failure_signatures(),
            ipc: RetryPolicy::default(),
        }
    }
}

impl PlayerConfig {
    pub fn quit_timeout(&self) -> Duration {
        Duration::from_millis(self.quit_timeout_ms)
    }

    /// Log file used by the profile named `mode`.
    pub fn log_file(&self, mode: &str) -> PathBuf {
        self.log_dir.join(format!("mpv-signage-{mode}.log"))
    }

    /// Ordered launch attempts for the resolved strategy.
    pub fn launch_plan(&self) -> Vec<LaunchSpec> {
        match self.launch.resolve() {
            LaunchStrategy::Desktop => vec![self.spec(
                "desktop",
                &self.desktop_args,
                &[],
                Duration::from_millis(self.desktop_settle_ms),
            )],
            _ => self
                .profiles
                .iter()
                .map(|profile| {
                    self.spec(
                        &profile.name,
                        &self.base_args,
                        &profile.args,
                        Duration::from_millis(self.settle_ms),
                    )
                })
                .collect(),
        }
    }

    fn spec(&self, mode: &str, base: &[String], extra: &[String], settle: Duration) -> LaunchSpec {
        let log_file = self.log_file(mode);
        let ctx = TemplateContext::new().with_launch(&self.ipc_path, &log_file, mode);

        let mut args = ctx.substitute_all(base);
        args.extend(ctx.substitute_all(extra));

        LaunchSpec {
            mode: mode.to_string(),
            args,
            log_file,
            settle,
        }
    }
}
