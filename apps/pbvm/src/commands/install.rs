//! Install command for the pbvm CLI.
//!
//! Downloads, installs and activates a release of the compiler. A version
//! that is already installed is activated without contacting GitHub.
//!
//! ## Usage
//!
//! ```bash
//! pbvm install v3.12.3
//! ```

use anyhow::Result;
use clap::Args;

use pbvm::config::Config;
use pbvm::errors::PbvmError;
use pbvm::toolchain::{
    Platform, ReleaseSource, activate_version, download_version, is_installed_version,
    select_asset, validate_version,
};

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Release tag to install (e.g., "v3.12.3").
    pub version: String,
}

/// Executes the install command.
///
/// # Process
///
/// 1. Fetch the release for the tag
/// 2. Select the asset for the current platform
/// 3. Download and extract it, reusing a cached archive
/// 4. Activate the version
///
/// # Errors
///
/// Returns an error if:
/// - The release does not exist
/// - No asset matches the current platform
/// - Download, extraction or activation fails
pub async fn execute(args: &InstallArgs, config: &Config) -> Result<()> {
    let version = args.version.as_str();
    validate_version(version)?;
    let paths = config.paths()?;

    let (installed, _) = is_installed_version(&paths, version)?;
    if installed {
        println!("Version {version} is already installed.");
    } else {
        let source = ReleaseSource::new(&config.release)?;

        println!("Searching release {version}...");
        let release = source.fetch_release(version).await?;

        let platform = Platform::detect();
        let asset = select_asset(&release.assets, &config.asset_prefix, &platform)
            .ok_or_else(|| PbvmError::no_suitable_asset(version, platform.os(), platform.arch()))?;

        println!("Downloading {}...", asset.name);
        download_version(&paths, version, asset, config.download_timeout).await?;
        println!("Version {version} installed.");
    }

    activate_version(&paths, version)?;
    println!("Version {version} is active.");

    Ok(())
}
