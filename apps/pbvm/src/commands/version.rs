//! Version command for the pbvm CLI.
//!
//! Displays the pbvm version. In verbose mode, also shows the commit it was
//! built from and the platform labels used to pick release assets.

use anyhow::Result;
use clap::Args;

use pbvm::toolchain::Platform;

/// Arguments for the version command.
#[derive(Args)]
pub struct VersionArgs {
    /// Show the commit and platform as well.
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

/// Executes the version command.
#[allow(clippy::unnecessary_wraps)]
pub fn execute(args: &VersionArgs) -> Result<()> {
    println!("pbvm {}", env!("CARGO_PKG_VERSION"));
    if args.verbose {
        println!();
        println!("Build Information:");
        println!("  Commit:   {}", git_commit());
        println!("  Platform: {}", Platform::detect());
    }
    Ok(())
}

/// Returns the git commit hash recorded at build time.
fn git_commit() -> &'static str {
    option_env!("PBVM_GIT_COMMIT").unwrap_or("unknown")
}
