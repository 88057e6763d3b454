//! Runtime configuration for pbvm.
//!
//! Settings are resolved once at startup into a [`Config`] value, which is
//! passed by reference to every operation that needs one. Nothing reads the
//! environment after that point.
//!
//! ## Environment Variables
//!
//! - `PBVM_HOME` - root directory (default: `~/.pbvm`)
//! - `PBVM_GITHUB_API` - GitHub API base URL (default: `https://api.github.com`)
//! - `GITHUB_TOKEN` - token sent to the GitHub API, if set
//! - `PBVM_DOWNLOAD_TIMEOUT` - download timeout in seconds (default: none)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::toolchain::HomePaths;

/// Application name; roots the home directory at `~/.{APP_NAME}`.
pub const APP_NAME: &str = "pbvm";

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "PBVM_HOME";

/// Environment variable overriding the GitHub API base URL.
pub const GITHUB_API_ENV: &str = "PBVM_GITHUB_API";

/// Environment variable holding an optional GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable holding the download timeout in seconds.
pub const DOWNLOAD_TIMEOUT_ENV: &str = "PBVM_DOWNLOAD_TIMEOUT";

const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const RELEASE_OWNER: &str = "protocolbuffers";
const RELEASE_REPO: &str = "protobuf";
const ASSET_PREFIX: &str = "protoc";

/// Where releases are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSourceConfig {
    /// Base URL of the GitHub REST API, without a trailing slash.
    pub api_url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Token sent as a bearer credential.
    pub token: Option<String>,
}

impl Default for ReleaseSourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API.to_string(),
            owner: RELEASE_OWNER.to_string(),
            repo: RELEASE_REPO.to_string(),
            token: None,
        }
    }
}

/// Configuration shared by all commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicit home root replacing `~/.{app}`.
    pub home_override: Option<PathBuf>,
    /// Release source settings.
    pub release: ReleaseSourceConfig,
    /// Prefix every suitable asset name starts with.
    pub asset_prefix: String,
    /// Timeout applied to downloads; `None` waits indefinitely.
    pub download_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_override: None,
            release: ReleaseSourceConfig::default(),
            asset_prefix: ASSET_PREFIX.to_string(),
            download_timeout: None,
        }
    }
}

impl Config {
    /// Builds the configuration from defaults and environment variables.
    ///
    /// Empty or whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `PBVM_DOWNLOAD_TIMEOUT` is not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = env_value(HOME_ENV) {
            config.home_override = Some(PathBuf::from(home));
        }
        if let Some(api_url) = env_value(GITHUB_API_ENV) {
            config.release.api_url = api_url.trim_end_matches('/').to_string();
        }
        config.release.token = env_value(GITHUB_TOKEN_ENV);

        if let Some(raw) = env_value(DOWNLOAD_TIMEOUT_ENV) {
            let secs: u64 = raw.parse().with_context(|| {
                format!("{DOWNLOAD_TIMEOUT_ENV} must be a number of seconds, got '{raw}'")
            })?;
            config.download_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Resolves the directory layout for this configuration.
    ///
    /// A relative override is resolved against the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory cannot be
    /// determined, or if a relative override cannot be made absolute.
    pub fn paths(&self) -> Result<HomePaths> {
        match &self.home_override {
            Some(root) => {
                let root = std::path::absolute(root).with_context(|| {
                    format!("Failed to resolve {HOME_ENV}: {}", root.display())
                })?;
                Ok(HomePaths::with_root(root))
            }
            None => HomePaths::for_app(APP_NAME),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for name in [
            HOME_ENV,
            GITHUB_API_ENV,
            GITHUB_TOKEN_ENV,
            DOWNLOAD_TIMEOUT_ENV,
        ] {
            unsafe { std::env::remove_var(name) };
        }
    }

    #[test]
    fn default_points_at_protobuf_releases() {
        let config = Config::default();
        assert_eq!(config.asset_prefix, "protoc");
        assert_eq!(config.release.api_url, "https://api.github.com");
        assert_eq!(config.release.owner, "protocolbuffers");
        assert_eq!(config.release.repo, "protobuf");
        assert!(config.download_timeout.is_none());
    }

    #[test]
    #[serial_test::serial]
    fn from_env_without_variables_matches_default() {
        clear_env();
        let config = Config::from_env().expect("Should build config");
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial_test::serial]
    fn from_env_reads_overrides() {
        clear_env();
        unsafe {
            std::env::set_var(HOME_ENV, "/tmp/pbvm-home");
            std::env::set_var(GITHUB_API_ENV, "http://localhost:8080/");
            std::env::set_var(GITHUB_TOKEN_ENV, "secret");
            std::env::set_var(DOWNLOAD_TIMEOUT_ENV, "30");
        }

        let config = Config::from_env().expect("Should build config");
        assert_eq!(config.home_override, Some(PathBuf::from("/tmp/pbvm-home")));
        assert_eq!(config.release.api_url, "http://localhost:8080");
        assert_eq!(config.release.token.as_deref(), Some("secret"));
        assert_eq!(config.download_timeout, Some(Duration::from_secs(30)));

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn from_env_ignores_blank_values() {
        clear_env();
        unsafe {
            std::env::set_var(HOME_ENV, "   ");
            std::env::set_var(DOWNLOAD_TIMEOUT_ENV, "0");
        }

        let config = Config::from_env().expect("Should build config");
        assert!(config.home_override.is_none());
        assert!(config.download_timeout.is_none());

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn from_env_rejects_malformed_timeout() {
        clear_env();
        unsafe { std::env::set_var(DOWNLOAD_TIMEOUT_ENV, "soon") };

        let err = Config::from_env().expect_err("Should reject timeout");
        assert!(err.to_string().contains(DOWNLOAD_TIMEOUT_ENV));

        clear_env();
    }

    #[test]
    fn paths_use_override_root() {
        let config = Config {
            home_override: Some(PathBuf::from("/opt/pbvm")),
            ..Config::default()
        };
        let paths = config.paths().expect("Should resolve paths");
        assert_eq!(paths.root, PathBuf::from("/opt/pbvm"));
        assert_eq!(paths.versions, PathBuf::from("/opt/pbvm/versions"));
    }

    #[test]
    #[serial_test::serial]
    fn paths_make_relative_override_absolute() {
        let config = Config {
            home_override: Some(PathBuf::from("relhome")),
            ..Config::default()
        };
        let paths = config.paths().expect("Should resolve paths");
        assert!(paths.root.is_absolute());
        assert_eq!(
            paths.root,
            std::env::current_dir().unwrap().join("relhome")
        );
    }

    #[test]
    fn paths_without_override_use_app_name() {
        if let Ok(paths) = Config::default().paths() {
            assert_eq!(
                paths.root.file_name().unwrap(),
                format!(".{APP_NAME}").as_str()
            );
        }
    }
}
