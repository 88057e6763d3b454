//! Path management for pbvm.
//!
//! Every installation lives under a per-application root, `~/.{app}/`, which
//! can be overridden by setting the `PBVM_HOME` environment variable.
//!
//! ## Directory Structure
//!
//! ```text
//! ~/.pbvm/                    # Root directory (or PBVM_HOME)
//!   versions/                 # Installed versions, one directory per release tag
//!     v3.12.3/
//!       bin/protoc
//!       include/google/protobuf/...
//!   active/                   # Symlinks into the active version
//!     bin -> ~/.pbvm/versions/v3.12.3/bin
//!     include -> ~/.pbvm/versions/v3.12.3/include
//!   tmp/                      # Download cache, keyed by asset file name
//!     protoc-3.12.3-linux-x86_64.zip
//! ```
//!
//! The layout is shared with existing installations and must not change.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::errors::PbvmError;

/// Resolved directory layout for one application namespace.
///
/// Construction performs no I/O; only [`HomePaths::prepare`] touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePaths {
    /// Root directory (`~/.{app}` or `PBVM_HOME`).
    pub root: PathBuf,
    /// Directory containing installed versions.
    pub versions: PathBuf,
    /// Directory for cached downloads and extraction staging.
    pub tmp: PathBuf,
    /// Directory holding the active version's symlinks.
    pub active: PathBuf,
}

impl HomePaths {
    /// Resolves the layout rooted at `~/.{app}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user's home directory cannot be determined.
    pub fn for_app(app: &str) -> Result<Self> {
        let home = dirs::home_dir().ok_or(PbvmError::HomeDirUnavailable)?;
        Ok(Self::with_root(home.join(format!(".{app}"))))
    }

    /// Creates the layout under an explicit root directory.
    #[must_use = "returns new paths instance without side effects"]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            versions: root.join("versions"),
            tmp: root.join("tmp"),
            active: root.join("active"),
            root,
        }
    }

    /// Returns the installation directory of a version.
    ///
    /// The tag is used verbatim as the directory name.
    #[must_use = "returns the path without side effects"]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions.join(version)
    }

    /// Returns the cache location of a downloaded asset.
    #[must_use = "returns the path without side effects"]
    pub fn download_path(&self, filename: &str) -> PathBuf {
        self.tmp.join(filename)
    }

    /// Returns the path of a link inside the active directory.
    #[must_use = "returns the path without side effects"]
    pub fn active_link(&self, name: &str) -> PathBuf {
        self.active.join(name)
    }

    /// Creates the root, tmp, versions and active directories.
    ///
    /// Directories are created with mode `0o755` on Unix. Existing
    /// directories are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.root, &self.tmp, &self.versions, &self.active] {
            create_dir(dir)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder
        .create(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}
