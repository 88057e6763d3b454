//! Installing, listing and deleting versions.
//!
//! A version is installed when `versions/{version}` exists. Archives are
//! extracted into a staging directory under `tmp/` and moved into
//! `versions/` with a single rename, so a version directory is never seen
//! half-populated.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use super::activation::active_version;
use super::archive::extract_zip;
use super::date::format_date;
use super::download::download_file;
use super::paths::HomePaths;
use super::release::ReleaseAsset;
use crate::errors::PbvmError;

/// An installed version as shown by `list-local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    /// Release tag, equal to the directory name.
    pub version: String,
    /// Modification time of the version directory.
    pub installed_at: SystemTime,
    /// Whether this is the active version.
    pub active: bool,
}

impl InstalledVersion {
    /// Returns the install date as `YYYY.MM.DD`.
    #[must_use]
    pub fn install_date(&self) -> String {
        format_date(self.installed_at)
    }
}

/// Checks that `version` can be used as a single directory name.
///
/// # Errors
///
/// Returns [`PbvmError::InvalidVersion`] for empty names, `.`, `..`, and
/// names containing path separators.
pub fn validate_version(version: &str) -> Result<()> {
    if is_single_component(version) {
        Ok(())
    } else {
        Err(PbvmError::invalid_version(version).into())
    }
}

fn is_single_component(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Reports whether `version` is installed, along with its directory.
///
/// Any entry at `versions/{version}` counts, whatever its type.
///
/// # Errors
///
/// Returns an error if the version name is invalid or the directory cannot
/// be inspected.
pub fn is_installed_version(paths: &HomePaths, version: &str) -> Result<(bool, PathBuf)> {
    validate_version(version)?;
    let dir = paths.version_dir(version);
    let installed = match std::fs::metadata(&dir) {
        Ok(_) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to inspect {}", dir.display()));
        }
    };
    Ok((installed, dir))
}

/// Installs `version` from `asset` unless it is already installed.
///
/// The archive is cached as `tmp/{asset.name}` and reused when present.
/// Returns `true` if the version was installed by this call and `false` if
/// it was already installed, in which case nothing is read or written.
///
/// # Errors
///
/// Returns an error if:
/// - The home layout cannot be created
/// - The asset name is not a plain file name ([`PbvmError::IllegalPath`])
/// - The download or extraction fails
pub async fn download_version(
    paths: &HomePaths,
    version: &str,
    asset: &ReleaseAsset,
    timeout: Option<Duration>,
) -> Result<bool> {
    validate_version(version)?;
    paths.prepare()?;

    let (installed, dir) = is_installed_version(paths, version)?;
    if installed {
        debug!(%version, dir = %dir.display(), "version already installed");
        return Ok(false);
    }

    if !is_single_component(&asset.name) {
        return Err(PbvmError::illegal_path(&asset.name).into());
    }

    let archive = paths.download_path(&asset.name);
    let cached = archive
        .try_exists()
        .with_context(|| format!("Failed to inspect {}", archive.display()))?;
    if cached {
        debug!(archive = %archive.display(), "using cached archive");
    } else {
        download_file(&asset.browser_download_url, &archive, timeout).await?;
    }

    if let Err(e) = install_archive(paths, version, &archive) {
        warn!(archive = %archive.display(), "removing archive that failed to install");
        let _ = std::fs::remove_file(&archive);
        return Err(e);
    }
    Ok(true)
}

/// Extracts `archive` as `version`.
///
/// Entries are extracted into a staging directory under `tmp/`, which is
/// renamed to `versions/{version}` on success and removed on failure.
///
/// # Errors
///
/// Returns an error if extraction or the final rename fails.
pub fn install_archive(paths: &HomePaths, version: &str, archive: &Path) -> Result<PathBuf> {
    validate_version(version)?;

    let staging = paths.tmp.join(format!(
        ".staging-{version}-{:016x}",
        rand::random::<u64>()
    ));
    let dest = paths.version_dir(version);

    let result = extract_zip(archive, &staging).and_then(|_| {
        std::fs::rename(&staging, &dest).with_context(|| {
            format!(
                "Failed to move {} to {}",
                staging.display(),
                dest.display()
            )
        })
    });

    if let Err(e) = result {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(e);
    }

    debug!(%version, dir = %dest.display(), "version installed");
    Ok(dest)
}

/// Lists installed versions in descending order of name.
///
/// Only real directories under `versions/` count. A missing `versions/`
/// directory yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory or the active link cannot be read.
pub fn list_installed_versions(paths: &HomePaths) -> Result<Vec<InstalledVersion>> {
    let exists = paths
        .versions
        .try_exists()
        .with_context(|| format!("Failed to inspect {}", paths.versions.display()))?;
    if !exists {
        return Ok(Vec::new());
    }

    let active = active_version(paths)?;
    let entries = std::fs::read_dir(&paths.versions).with_context(|| {
        format!(
            "Failed to read versions directory: {}",
            paths.versions.display()
        )
    })?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| "Failed to read directory entry")?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to inspect {}", entry.path().display()))?;
        if !file_type.is_dir() {
            continue;
        }

        let Ok(name) = entry.file_name().into_string() else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 version directory");
            continue;
        };
        let installed_at = entry
            .metadata()
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read mtime of {}", entry.path().display()))?;

        versions.push(InstalledVersion {
            active: active.as_deref() == Some(name.as_str()),
            version: name,
            installed_at,
        });
    }

    versions.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(versions)
}

/// Removes the installed `version` recursively.
///
/// Removing a version that is not installed succeeds. Callers refuse to
/// delete the active version.
///
/// # Errors
///
/// Returns an error if the version name is invalid or removal fails.
pub fn delete_version(paths: &HomePaths, version: &str) -> Result<()> {
    validate_version(version)?;
    let dir = paths.version_dir(version);
    let removed = match std::fs::symlink_metadata(&dir) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(&dir),
        Ok(_) => std::fs::remove_file(&dir),
        Err(e) => Err(e),
    };
    match removed {
        Ok(()) => {
            debug!(%version, "version deleted");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dir.display())),
    }
}
