//! Delete command for the pbvm CLI.
//!
//! ## Usage
//!
//! ```bash
//! pbvm delete v3.11.4
//! pbvm rm v3.11.4
//! ```

use anyhow::Result;
use clap::Args;

use pbvm::config::Config;
use pbvm::errors::PbvmError;
use pbvm::toolchain::{delete_version, is_active_version, is_installed_version};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Installed version to delete (e.g., "v3.11.4").
    pub version: String,
}

/// Executes the delete command.
///
/// The active version cannot be deleted; activate another one first.
///
/// # Errors
///
/// Returns an error if:
/// - The version is not installed ([`PbvmError::VersionNotInstalled`])
/// - The version is active ([`PbvmError::VersionActive`])
/// - Directory removal fails
pub fn execute(args: &DeleteArgs, config: &Config) -> Result<()> {
    let paths = config.paths()?;
    let version = args.version.as_str();

    let (installed, _) = is_installed_version(&paths, version)?;
    if !installed {
        return Err(PbvmError::version_not_installed(version).into());
    }
    if is_active_version(&paths, version)? {
        return Err(PbvmError::version_active(version).into());
    }

    delete_version(&paths, version)?;
    println!("Version {version} deleted.");

    Ok(())
}
