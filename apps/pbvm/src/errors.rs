//! Error types for pbvm.
//!
//! Most operations return `anyhow::Result` and attach context as they go.
//! The variants below are the conditions a caller has to tell apart from a
//! generic failure: they travel inside `anyhow::Error` and are recovered with
//! `downcast_ref` at the boundary that cares about them.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::APP_NAME;

/// Typed failures of the version lifecycle engine and the CLI on top of it.
#[derive(Debug, Error)]
pub enum PbvmError {
    /// The user's home directory could not be determined.
    #[error("cannot determine home directory; set PBVM_HOME to choose one")]
    HomeDirUnavailable,

    /// The version string is too short or cannot be used as a directory name.
    #[error("Version is incorrect: {version}")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
    },

    /// The release source has no release with this tag.
    #[error("release not found: {tag}")]
    ReleaseNotFound {
        /// The requested release tag.
        tag: String,
    },

    /// None of the release's assets matches the running platform.
    #[error("no suitable asset found in release {version} for {os}/{arch}")]
    NoSuitableAsset {
        /// The release tag that was searched.
        version: String,
        /// OS label used for matching.
        os: String,
        /// Architecture label used for matching.
        arch: String,
    },

    /// An archive entry would be written outside the destination directory.
    #[error("{}: illegal file path", .path.display())]
    IllegalPath {
        /// The offending entry name.
        path: PathBuf,
    },

    /// The operation requires an installed version.
    #[error("Version {version} is not installed")]
    VersionNotInstalled {
        /// The version that is missing.
        version: String,
    },

    /// The version cannot be deleted while it is active.
    #[error("Version {version} is active at the moment")]
    VersionActive {
        /// The active version.
        version: String,
    },

    /// Nothing has been activated yet.
    #[error("no active version")]
    NoActiveVersion,

    /// A child process exited with a non-zero code.
    ///
    /// The child already printed its own output, so the code is propagated
    /// without an additional message.
    #[error("process exited with code {code}")]
    ProcessExitCode {
        /// The exit code of the child process.
        code: i32,
    },
}

impl PbvmError {
    /// Creates a new `InvalidVersion` error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Creates a new `ReleaseNotFound` error.
    #[must_use]
    pub fn release_not_found(tag: impl Into<String>) -> Self {
        Self::ReleaseNotFound { tag: tag.into() }
    }

    /// Creates a new `NoSuitableAsset` error.
    #[must_use]
    pub fn no_suitable_asset(
        version: impl Into<String>,
        os: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self::NoSuitableAsset {
            version: version.into(),
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Creates a new `IllegalPath` error.
    #[must_use]
    pub fn illegal_path(path: impl Into<PathBuf>) -> Self {
        Self::IllegalPath { path: path.into() }
    }

    /// Creates a new `VersionNotInstalled` error.
    #[must_use]
    pub fn version_not_installed(version: impl Into<String>) -> Self {
        Self::VersionNotInstalled {
            version: version.into(),
        }
    }

    /// Creates a new `VersionActive` error.
    #[must_use]
    pub fn version_active(version: impl Into<String>) -> Self {
        Self::VersionActive {
            version: version.into(),
        }
    }

    /// Creates a new `ProcessExitCode` error.
    #[must_use]
    pub const fn process_exit_code(code: i32) -> Self {
        Self::ProcessExitCode { code }
    }

    /// Returns true for precondition failures that are reported to the user
    /// as a plain message rather than as an error chain.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidVersion { .. }
                | Self::VersionNotInstalled { .. }
                | Self::VersionActive { .. }
        )
    }

    /// A follow-up suggestion printed after the message, if there is one.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::VersionNotInstalled { version } => {
                Some(format!("Please, run: '{APP_NAME} install {version}'"))
            }
            Self::VersionActive { .. } => Some(format!(
                "Activate another version first with '{APP_NAME} activate <version>'"
            )),
            Self::ReleaseNotFound { .. } => Some(format!(
                "Run '{APP_NAME} list-remote' to see available versions."
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_path_displays_path() {
        let err = PbvmError::illegal_path("../../etc/passwd");
        assert_eq!(err.to_string(), "../../etc/passwd: illegal file path");
    }

    #[test]
    fn no_suitable_asset_names_platform() {
        let err = PbvmError::no_suitable_asset("v3.12.3", "linux", "x86_64");
        assert_eq!(
            err.to_string(),
            "no suitable asset found in release v3.12.3 for linux/x86_64"
        );
    }

    #[test]
    fn state_errors_match_cli_wording() {
        assert_eq!(
            PbvmError::version_not_installed("v3.12.3").to_string(),
            "Version v3.12.3 is not installed"
        );
        assert_eq!(
            PbvmError::version_active("v3.12.3").to_string(),
            "Version v3.12.3 is active at the moment"
        );
        assert_eq!(
            PbvmError::invalid_version("v3").to_string(),
            "Version is incorrect: v3"
        );
    }

    #[test]
    fn precondition_covers_only_state_errors() {
        assert!(PbvmError::version_not_installed("v1.0.0").is_precondition());
        assert!(PbvmError::version_active("v1.0.0").is_precondition());
        assert!(PbvmError::invalid_version("v1").is_precondition());
        assert!(!PbvmError::NoActiveVersion.is_precondition());
        assert!(!PbvmError::illegal_path("/etc").is_precondition());
        assert!(!PbvmError::process_exit_code(2).is_precondition());
    }

    #[test]
    fn hint_suggests_install_for_missing_version() {
        let hint = PbvmError::version_not_installed("v3.12.3").hint();
        assert_eq!(hint.as_deref(), Some("Please, run: 'pbvm install v3.12.3'"));
        assert!(PbvmError::NoActiveVersion.hint().is_none());
    }

    #[test]
    fn process_exit_code_displays_code() {
        let err = PbvmError::process_exit_code(42);
        assert_eq!(err.to_string(), "process exited with code 42");
    }

    #[test]
    fn typed_error_survives_anyhow_round_trip() {
        let err: anyhow::Error = PbvmError::NoActiveVersion.into();
        let err = err.context("reading active version");
        assert!(matches!(
            err.downcast_ref::<PbvmError>(),
            Some(PbvmError::NoActiveVersion)
        ));
    }
}
