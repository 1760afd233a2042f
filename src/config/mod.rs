mod types;

pub use types::*;

use anyhow::{Context, Result};
use signage_player::LaunchStrategy;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `authority.url`.
pub const AUTHORITY_URL_ENV: &str = "MASTER_URL";

/// Settings given on the command line. They win over the file and the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub authority_url: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref url) = self.authority_url {
            config.authority.url = url.clone();
        }
        if let Some(ref dir) = self.cache_dir {
            config.agent.cache_dir = dir.clone();
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = read_config(path)?;
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    load_config_with_overrides(custom_path, &ConfigOverrides::default())
}

/// Load config like [`load_config_or_default`], applying command-line
/// overrides before validation.
pub fn load_config_with_overrides(
    custom_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config> {
    let mut config = match custom_path {
        Some(path) => read_config(path)?,
        None => find_config()?,
    };

    apply_env_overrides(&mut config);
    overrides.apply(&mut config);
    validate_config(&config)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

fn find_config() -> Result<Config> {
    let default_paths = [
        "./signage.toml",
        "./config.toml",
        "~/.config/signage/config.toml",
        "/etc/signage/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return read_config(path);
        }
    }

    Ok(Config::default())
}

/// Apply overrides taken from the process environment.
pub fn apply_env_overrides(config: &mut Config) {
    override_authority_url(config, std::env::var(AUTHORITY_URL_ENV).ok());
}

fn override_authority_url(config: &mut Config, url: Option<String>) {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!("{} overrides authority url: {}", AUTHORITY_URL_ENV, url);
        config.authority.url = url;
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let url = config.authority.url.trim();
    if url.is_empty() {
        anyhow::bail!("Authority url cannot be empty");
    }
    reqwest::Url::parse(url).with_context(|| format!("Invalid authority url: {}", url))?;

    if config.agent.poll_interval_ms == 0 {
        anyhow::bail!("Poll interval cannot be 0");
    }

    if !config.agent.cache_dir.exists() {
        tracing::info!(
            "Cache directory {:?} does not exist yet, it will be created",
            config.agent.cache_dir
        );
    }

    let player = &config.player;
    if player.program.trim().is_empty() {
        anyhow::bail!("Player program cannot be empty");
    }

    if player.ipc.attempts == 0 {
        anyhow::bail!("Player IPC attempts cannot be 0");
    }

    if player.launch != LaunchStrategy::Desktop && player.profiles.is_empty() {
        anyhow::bail!("Launch strategy {:?} needs at least one profile", player.launch);
    }

    let mut seen = HashSet::new();
    for profile in &player.profiles {
        if !seen.insert(profile.name.as_str()) {
            anyhow::bail!("Duplicate player profile '{}'", profile.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signage_player::HardwareProfile;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        validate_config(&config).unwrap();
        assert_eq!(config.authority.url, "http://localhost:5000");
        assert_eq!(config.agent.poll_interval_ms, 500);
        assert_eq!(config.player.program, "mpv");
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
[authority]
url = "http://10.0.0.2:5000"

[agent]
cache_dir = "/srv/videos"

[player]
launch = "fallback"

[[player.profiles]]
name = "drm"
args = ["--vo=drm"]

[player.ipc]
attempts = 5
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.authority.manifest_timeout_ms, 2000);
        assert_eq!(config.agent.cache_dir, Path::new("/srv/videos"));
        assert_eq!(config.agent.poll_interval_ms, 500);
        assert_eq!(config.player.launch, LaunchStrategy::Fallback);
        assert_eq!(config.player.profiles, vec![HardwareProfile::new("drm", &["--vo=drm"])]);
        assert_eq!(config.player.ipc.attempts, 5);
        assert_eq!(config.player.ipc.backoff_ms, 500);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let file = write_config("[authority\nurl = 1");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/signage.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.agent.poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut config = Config::default();
        config.authority.url = "  ".to_string();
        assert!(validate_config(&config).is_err());

        config.authority.url = "not a url".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_ipc_attempts() {
        let mut config = Config::default();
        config.player.ipc.attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_fallback_needs_profiles() {
        let mut config = Config::default();
        config.player.launch = LaunchStrategy::Fallback;
        config.player.profiles.clear();
        assert!(validate_config(&config).is_err());

        config.player.launch = LaunchStrategy::Desktop;
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_rejects_duplicate_profiles() {
        let mut config = Config::default();
        config.player.profiles = vec![
            HardwareProfile::new("drm", &["--vo=drm"]),
            HardwareProfile::new("drm", &[]),
        ];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Duplicate player profile 'drm'"));
    }

    #[test]
    fn test_url_override() {
        let mut config = Config::default();
        override_authority_url(&mut config, Some("http://192.168.1.50:5000".to_string()));
        assert_eq!(config.authority.url, "http://192.168.1.50:5000");

        override_authority_url(&mut config, Some(String::new()));
        override_authority_url(&mut config, None);
        assert_eq!(config.authority.url, "http://192.168.1.50:5000");
    }

    #[test]
    fn test_cli_overrides_apply_before_validation() {
        let file = write_config("[authority]\nurl = \"not a url\"\n");
        assert!(load_config(file.path()).is_err());

        let overrides = ConfigOverrides {
            authority_url: Some("http://10.9.9.9:5000".to_string()),
            cache_dir: Some(PathBuf::from("/srv/signage")),
        };
        let config = load_config_with_overrides(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.authority.url, "http://10.9.9.9:5000");
        assert_eq!(config.agent.cache_dir, Path::new("/srv/signage"));
    }

    #[test]
    fn test_cli_override_beats_environment() {
        let mut config = Config::default();
        override_authority_url(&mut config, Some("not a url".to_string()));

        let overrides = ConfigOverrides {
            authority_url: Some("http://10.9.9.9:5000".to_string()),
            cache_dir: None,
        };
        overrides.apply(&mut config);
        validate_config(&config).unwrap();
        assert_eq!(config.agent.cache_dir, Config::default().agent.cache_dir);
    }
}
