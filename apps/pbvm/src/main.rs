#![warn(clippy::pedantic)]

//! # pbvm
//!
//! Version manager for the Protocol Buffers compiler (`protoc`).
//!
//! Releases are downloaded from GitHub into `~/.pbvm/versions/` and one of
//! them is made active through the symlinks in `~/.pbvm/active/`. Add
//! `~/.pbvm/active/bin` to `PATH` to use the active `protoc`.
//!
//! ## Subcommands
//!
//! - `install` - Install and activate a version
//! - `activate` - Activate an installed version
//! - `delete` (`rm`) - Remove an installed version
//! - `list-local` (`ls`) - List installed versions
//! - `list-remote` - List published versions
//! - `run` - Run a command under a version
//! - `version` - Display version information
//! - `completion` - Generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! pbvm install v3.12.3
//! pbvm list-local
//! pbvm run --version v3.11.4 "protoc --version"
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{activate, completion, delete, install, list_local, list_remote, run, version};
use pbvm::config::Config;
use pbvm::errors::PbvmError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PBVM_LOG";

/// Protocol Buffers compiler version manager.
#[derive(Parser)]
#[command(
    name = "pbvm",
    author,
    about = "Protocol Buffers compiler version manager",
    long_about = "Installs releases of protoc from GitHub and switches between them. \
    Add ~/.pbvm/active/bin to PATH to use the active version.",
    after_help = "\
ENVIRONMENT VARIABLES:
    PBVM_HOME               Root directory (default: ~/.pbvm)
    PBVM_GITHUB_API         GitHub API base URL (default: https://api.github.com)
    GITHUB_TOKEN            Token sent to the GitHub API
    PBVM_DOWNLOAD_TIMEOUT   Download timeout in seconds (default: none)
    PBVM_LOG                Log filter, e.g. 'debug' (default: warn)"
)]
pub struct Cli {
    /// Print debug logs to stderr.
    #[clap(long = "debug", global = true, action = clap::ArgAction::SetTrue)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the pbvm CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Install a version.
    ///
    /// If the version was installed before, it is only activated. Otherwise
    /// it is downloaded, installed and activated. Use 'list-remote' to see
    /// available versions.
    Install(install::InstallArgs),

    /// Activate an installed version.
    Activate(activate::ActivateArgs),

    /// Delete an installed version.
    ///
    /// The active version cannot be deleted.
    #[command(alias = "rm")]
    Delete(delete::DeleteArgs),

    /// List installed versions.
    #[command(name = "list-local", alias = "ls")]
    ListLocal,

    /// List available versions.
    #[command(name = "list-remote")]
    ListRemote(list_remote::ListRemoteArgs),

    /// Run a command under a version.
    ///
    /// The version is activated for the duration of the command, then the
    /// previous activation is restored.
    Run(run::RunArgs),

    /// Display version information.
    Version(version::VersionArgs),

    /// Generate a shell completion script.
    Completion(completion::CompletionArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = dispatch(cli.command).await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Installs the stderr log subscriber.
///
/// `PBVM_LOG` takes precedence; otherwise `--debug` selects `debug` and the
/// default is `warn`.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Handles an error and returns the appropriate exit code.
///
/// For `ProcessExitCode` errors, returns the embedded exit code without
/// printing anything (the child already printed its output). State
/// preconditions print a one-line message. All other errors print the
/// error chain and return exit code 1.
fn handle_error(e: &anyhow::Error) -> i32 {
    let typed = e.downcast_ref::<PbvmError>();

    if let Some(PbvmError::ProcessExitCode { code }) = typed {
        return *code;
    }

    if let Some(err) = typed
        && err.is_precondition()
    {
        eprintln!("{err}");
    } else {
        eprintln!("Error: {e:?}");
    }

    if let Some(hint) = typed.and_then(PbvmError::hint) {
        eprintln!("{hint}");
    }
    1
}

/// Runs a subcommand. Commands touching the home directory or the network
/// resolve the configuration first.
async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Install(args) => install::execute(&args, &Config::from_env()?).await,
        Commands::Activate(args) => activate::execute(&args, &Config::from_env()?),
        Commands::Delete(args) => delete::execute(&args, &Config::from_env()?),
        Commands::ListLocal => list_local::execute(&Config::from_env()?),
        Commands::ListRemote(args) => list_remote::execute(&args, &Config::from_env()?).await,
        Commands::Run(args) => run::execute(&args, &Config::from_env()?),
        Commands::Version(args) => version::execute(&args),
        Commands::Completion(args) => {
            completion::execute(&args);
            Ok(())
        }
    }
}
