//! Completion command for the pbvm CLI.
//!
//! ## Usage
//!
//! ```bash
//! pbvm completion bash > /etc/bash_completion.d/pbvm
//! pbvm completion zsh > "${fpath[1]}/_pbvm"
//! ```

use clap::{Args, CommandFactory};
use clap_complete::Shell;

use crate::Cli;

/// Arguments for the completion command.
#[derive(Args)]
pub struct CompletionArgs {
    /// Shell to generate the script for.
    #[clap(value_enum)]
    pub shell: Shell,
}

/// Writes the completion script for the chosen shell to stdout.
pub fn execute(args: &CompletionArgs) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, name, &mut std::io::stdout());
}
