//! Run command for the pbvm CLI.
//!
//! Runs a single command with a given version temporarily activated, then
//! restores whatever was active before (or leaves nothing active if nothing
//! was).
//!
//! ## Usage
//!
//! ```bash
//! pbvm run --version v3.12.3 protoc --version
//! pbvm run --version v3.12.3 "protoc -I. --go_out=. api.proto"
//! ```
//!
//! A single quoted argument is split on whitespace. The version's `bin/`
//! directory is prepended to `PATH` for the child, so `protoc` resolves to
//! the requested version.
//!
//! Activation is global: other shells see the temporary version while the
//! command runs.

use anyhow::{Context, Result, bail};
use clap::Args;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use pbvm::config::Config;
use pbvm::errors::PbvmError;
use pbvm::toolchain::{
    HomePaths, activate_version, active_version, deactivate, is_installed_version,
};

/// Shortest accepted version string, e.g. `v3.0`.
const MIN_VERSION_LEN: usize = 5;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Installed version to run the command under (e.g., "v3.12.3").
    #[clap(long)]
    pub version: String,

    /// Command to run, with its arguments.
    #[clap(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Executes the run command.
///
/// ## Exit Codes
///
/// - Returns `Ok(())` if the command succeeds
/// - Returns `Err(PbvmError::ProcessExitCode)` if it exits with a non-zero code
///
/// ## Errors
///
/// Returns an error if:
/// - The version is shorter than 5 characters or not installed
/// - The command is empty or cannot be started
/// - Activation or restoring the previous activation fails
pub fn execute(args: &RunArgs, config: &Config) -> Result<()> {
    let version = args.version.as_str();
    if version.chars().count() < MIN_VERSION_LEN {
        return Err(PbvmError::invalid_version(version).into());
    }

    let paths = config.paths()?;
    let (installed, _) = is_installed_version(&paths, version)?;
    if !installed {
        return Err(PbvmError::version_not_installed(version).into());
    }

    let (program, program_args) = split_command(&args.command)?;
    let previous = active_version(&paths)?;

    activate_version(&paths, version)?;
    let result = run_child(&paths, version, &program, &program_args);
    let restored = restore(&paths, previous.as_deref());

    match (result, restored) {
        (Err(e), Err(restore_err)) => {
            warn!(error = %restore_err, "failed to restore the previous activation");
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

/// Splits the command into program and arguments.
///
/// A lone argument holding a whole command line is split on whitespace.
fn split_command(command: &[String]) -> Result<(String, Vec<String>)> {
    let parts: Vec<String> = match command {
        [single] => single.split_whitespace().map(ToString::to_string).collect(),
        _ => command.to_vec(),
    };

    match parts.split_first() {
        Some((program, rest)) if !program.is_empty() => Ok((program.clone(), rest.to_vec())),
        _ => bail!("No command given to run"),
    }
}

/// Runs `program` with the version's `bin/` first on `PATH`.
fn run_child(paths: &HomePaths, version: &str, program: &str, args: &[String]) -> Result<()> {
    let bin_dir = paths.version_dir(version).join("bin");
    let search_path = prepend_to_path(&bin_dir)?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let resolved = which::which_in(program, Some(&search_path), &cwd)
        .unwrap_or_else(|_| PathBuf::from(program));
    debug!(program = %resolved.display(), %version, "running command");

    let status = Command::new(&resolved)
        .args(args)
        .env("PATH", &search_path)
        .stdin(std::process::Stdio::inherit())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute {program}"))?;

    if status.success() {
        Ok(())
    } else {
        let code = status.code().unwrap_or(1);
        Err(PbvmError::process_exit_code(code).into())
    }
}

fn prepend_to_path(dir: &Path) -> Result<OsString> {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let dirs = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&current));
    std::env::join_paths(dirs).context("Failed to build PATH for the command")
}

fn restore(paths: &HomePaths, previous: Option<&str>) -> Result<()> {
    match previous {
        Some(version) => activate_version(paths, version),
        None => deactivate(paths),
    }
}
