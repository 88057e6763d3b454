//! Switching the active version.
//!
//! The active version is represented only by the symlinks `active/bin` and
//! `active/include`, pointing into `versions/{version}/`. No other state file
//! records it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::install::validate_version;
use super::paths::HomePaths;
use crate::errors::PbvmError;

/// Subdirectories of a version exposed through `active/`.
pub const LINKED_DIRS: [&str; 2] = ["bin", "include"];

/// Makes `version` the active version.
///
/// Both links are first created under temporary names inside `active/` and
/// then renamed over the final names. If creating either temporary link
/// fails, the previous activation is left untouched. If a rename fails, the
/// links already switched are pointed back at their previous targets.
/// Anything already at a final name is replaced.
///
/// Link targets are absolute, so a relative home root still yields links
/// that resolve.
///
/// The version is not required to be installed; callers check that first.
///
/// # Errors
///
/// Returns an error if the version name is invalid or a link cannot be
/// created or renamed.
pub fn activate_version(paths: &HomePaths, version: &str) -> Result<()> {
    validate_version(version)?;

    std::fs::create_dir_all(&paths.active).with_context(|| {
        format!(
            "Failed to create active directory: {}",
            paths.active.display()
        )
    })?;

    let token: u32 = rand::random();
    let version_dir = std::path::absolute(paths.version_dir(version))
        .context("Failed to resolve the version directory")?;
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(LINKED_DIRS.len());

    for name in LINKED_DIRS {
        let staged_link = paths.active.join(format!(".{name}.{token:08x}.tmp"));
        if let Err(e) = create_dir_link(&version_dir.join(name), &staged_link) {
            for (link, _) in &staged {
                let _ = remove_link(link);
            }
            return Err(e);
        }
        staged.push((staged_link, paths.active_link(name)));
    }

    commit_links(&staged)?;

    debug!(%version, "version activated");
    Ok(())
}

/// Renames each staged link over its final name, in order.
///
/// On failure, every staged link still present is removed and the final
/// links handled so far get their previous targets back.
fn commit_links(staged: &[(PathBuf, PathBuf)]) -> Result<()> {
    let previous: Vec<Option<PathBuf>> = staged
        .iter()
        .map(|(_, link)| std::fs::read_link(link).ok())
        .collect();

    for (index, (staged_link, final_link)) in staged.iter().enumerate() {
        let Err(e) = replace_link(staged_link, final_link) else {
            continue;
        };

        for (link, _) in staged {
            if link.symlink_metadata().is_ok() {
                let _ = remove_link(link);
            }
        }
        for ((_, link), target) in staged.iter().zip(&previous).take(index + 1) {
            if let Err(restore_err) = restore_link(link, target.as_deref()) {
                warn!(
                    link = %link.display(),
                    error = %restore_err,
                    "active links may point at different versions"
                );
            }
        }
        return Err(e);
    }
    Ok(())
}

/// Points `link` back at `target`, or removes it when there was none.
fn restore_link(link: &Path, target: Option<&Path>) -> Result<()> {
    let current = std::fs::read_link(link).ok();
    if current.as_deref() == target {
        return Ok(());
    }
    if current.is_some() {
        remove_link(link).with_context(|| format!("Failed to remove {}", link.display()))?;
    }
    match target {
        Some(target) if link.symlink_metadata().is_err() => create_dir_link(target, link),
        _ => Ok(()),
    }
}

/// Returns the active version.
///
/// The version is the name of the directory containing the `active/bin`
/// link target, e.g. `v3.12.3` for `~/.pbvm/versions/v3.12.3/bin`.
///
/// # Errors
///
/// Returns [`PbvmError::NoActiveVersion`] if `active/bin` does not exist, or
/// an error if it cannot be read or its target has no parent directory.
pub fn get_active_version(paths: &HomePaths) -> Result<String> {
    let link = paths.active_link(LINKED_DIRS[0]);

    let target = match std::fs::read_link(&link) {
        Ok(target) => target,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PbvmError::NoActiveVersion.into());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read link: {}", link.display()));
        }
    };

    target
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map(ToString::to_string)
        .with_context(|| {
            format!(
                "Active link {} points to an unexpected target: {}",
                link.display(),
                target.display()
            )
        })
}

/// Returns the active version, or `None` when nothing is active.
///
/// # Errors
///
/// Returns an error for any failure other than the absence of a link.
pub fn active_version(paths: &HomePaths) -> Result<Option<String>> {
    match get_active_version(paths) {
        Ok(version) => Ok(Some(version)),
        Err(e) if matches!(
            e.downcast_ref::<PbvmError>(),
            Some(PbvmError::NoActiveVersion)
        ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Reports whether `version` is the active version.
///
/// Having no active version at all yields `false`.
///
/// # Errors
///
/// Returns an error if the active link exists but cannot be read.
pub fn is_active_version(paths: &HomePaths, version: &str) -> Result<bool> {
    Ok(active_version(paths)?.as_deref() == Some(version))
}

/// Removes the active links, leaving no version active.
///
/// Missing links are ignored.
///
/// # Errors
///
/// Returns an error if an existing link cannot be removed.
pub fn deactivate(paths: &HomePaths) -> Result<()> {
    for name in LINKED_DIRS {
        let link = paths.active_link(name);
        if link.symlink_metadata().is_ok() {
            remove_link(&link)
                .with_context(|| format!("Failed to remove link: {}", link.display()))?;
        }
    }
    debug!("active version cleared");
    Ok(())
}

/// Renames `staged` over `link`, clearing whatever `rename` cannot replace.
fn replace_link(staged: &Path, link: &Path) -> Result<()> {
    if let Ok(meta) = link.symlink_metadata() {
        let is_link = meta.file_type().is_symlink();
        let removed = if !is_link && meta.is_dir() {
            std::fs::remove_dir_all(link)
        } else if !is_link || cfg!(windows) {
            remove_link(link)
        } else {
            Ok(())
        };
        removed.with_context(|| format!("Failed to remove {}", link.display()))?;
    }

    std::fs::rename(staged, link).with_context(|| {
        format!(
            "Failed to move link {} to {}",
            staged.display(),
            link.display()
        )
    })
}

/// Creates a directory symbolic link at `link` pointing to `target`.
fn create_dir_link(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    let created = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let created = std::os::windows::fs::symlink_dir(target, link);

    created.with_context(|| {
        format!(
            "Failed to create symlink from {} to {}",
            link.display(),
            target.display()
        )
    })
}

/// Removes a link without following it.
fn remove_link(link: &Path) -> std::io::Result<()> {
    #[cfg(windows)]
    {
        // Directory symlinks are directories on Windows.
        std::fs::remove_dir(link).or_else(|_| std::fs::remove_file(link))
    }

    #[cfg(not(windows))]
    {
        std::fs::remove_file(link)
    }
}
