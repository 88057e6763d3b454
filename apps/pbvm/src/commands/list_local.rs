//! List-local command for the pbvm CLI.
//!
//! ## Output Format
//!
//! ```text
//! Version   Install date   Active
//! v3.12.3   2020.06.10     true
//! v3.11.4   2020.03.02     false
//! ```

use anyhow::Result;

use super::table::Table;
use pbvm::config::Config;
use pbvm::toolchain::list_installed_versions;

/// Executes the list-local command.
///
/// # Errors
///
/// Returns an error if the versions directory or the active link cannot be read.
pub fn execute(config: &Config) -> Result<()> {
    let paths = config.paths()?;
    let versions = list_installed_versions(&paths)?;

    if versions.is_empty() {
        println!("No versions installed.");
        println!();
        println!("Run 'pbvm list-remote' to see available versions.");
        return Ok(());
    }

    let mut table = Table::new(&["Version", "Install date", "Active"]);
    for version in &versions {
        table.push_row(vec![
            version.version.clone(),
            version.install_date(),
            version.active.to_string(),
        ]);
    }
    print!("{}", table.render());

    Ok(())
}
