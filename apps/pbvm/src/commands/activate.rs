//! Activate command for the pbvm CLI.
//!
//! Points `active/bin` and `active/include` at an installed version.

use anyhow::Result;
use clap::Args;

use pbvm::config::Config;
use pbvm::errors::PbvmError;
use pbvm::toolchain::{activate_version, is_active_version, is_installed_version};

/// Arguments for the activate command.
#[derive(Args)]
pub struct ActivateArgs {
    /// Installed version to activate (e.g., "v3.12.3").
    pub version: String,
}

/// Executes the activate command.
///
/// # Errors
///
/// Returns [`PbvmError::VersionNotInstalled`] if the version is not
/// installed, or an error if the links cannot be updated.
pub fn execute(args: &ActivateArgs, config: &Config) -> Result<()> {
    let paths = config.paths()?;
    let version = args.version.as_str();

    let (installed, _) = is_installed_version(&paths, version)?;
    if !installed {
        return Err(PbvmError::version_not_installed(version).into());
    }

    if is_active_version(&paths, version)? {
        println!("Version {version} is already active.");
        return Ok(());
    }

    activate_version(&paths, version)?;
    println!("Version {version} is active.");

    Ok(())
}
