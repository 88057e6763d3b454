//! List-remote command for the pbvm CLI.
//!
//! Lists the latest releases published on GitHub and marks the installed ones.
//!
//! ## Usage
//!
//! ```bash
//! pbvm list-remote          # Latest 10 releases
//! pbvm list-remote -n 30    # Latest 30 releases
//! pbvm list-remote --json   # Output in JSON format
//! ```

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::table::Table;
use pbvm::config::Config;
use pbvm::toolchain::{HomePaths, Release, ReleaseSource, is_installed_version};

/// Arguments for the list-remote command.
#[derive(Args)]
pub struct ListRemoteArgs {
    /// Number of latest releases to show.
    #[clap(long, short = 'n', default_value_t = 10)]
    pub number: usize,

    /// Show releases in JSON format.
    #[clap(long, short = 'j')]
    pub json: bool,
}

/// Release information for JSON output.
#[derive(Debug, Clone, Serialize)]
struct ReleaseInfo {
    version: String,
    prerelease: bool,
    date: String,
    installed: bool,
}

/// Executes the list-remote command.
///
/// # Errors
///
/// Returns an error if the home directory cannot be resolved or the
/// releases cannot be fetched.
pub async fn execute(args: &ListRemoteArgs, config: &Config) -> Result<()> {
    let paths = config.paths()?;
    let source = ReleaseSource::new(&config.release)?;
    let releases = source.list_releases(args.number).await?;
    let infos = collect_infos(&paths, &releases);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    if infos.is_empty() {
        println!("No releases available.");
        return Ok(());
    }

    let mut table = Table::new(&["Version", "Pre-release", "Date", "Installed"]);
    for info in infos {
        table.push_row(vec![
            info.version,
            info.prerelease.to_string(),
            info.date,
            info.installed.to_string(),
        ]);
    }
    print!("{}", table.render());

    Ok(())
}

fn collect_infos(paths: &HomePaths, releases: &[Release]) -> Vec<ReleaseInfo> {
    releases
        .iter()
        .map(|release| {
            // Tags that cannot be directory names are never installed.
            let installed = is_installed_version(paths, &release.tag_name)
                .map(|(installed, _)| installed)
                .unwrap_or(false);
            ReleaseInfo {
                version: release.tag_name.clone(),
                prerelease: release.prerelease,
                date: release.published_date(),
                installed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, prerelease: bool) -> Release {
        Release {
            tag_name: tag.to_string(),
            prerelease,
            published_at: Some("2020-06-02T22:19:32Z".to_string()),
            assets: Vec::new(),
        }
    }

    #[test]
    fn collect_infos_marks_installed_versions() {
        let root =
            std::env::temp_dir().join(format!("pbvm_test_remote_{}", rand::random::<u64>()));
        let paths = HomePaths::with_root(root);
        std::fs::create_dir_all(paths.version_dir("v3.12.3")).unwrap();

        let releases = vec![
            release("v3.13.0-rc1", true),
            release("v3.12.3", false),
            release("../odd", false),
        ];
        let infos = collect_infos(&paths, &releases);

        assert_eq!(infos.len(), 3);
        assert!(infos[0].prerelease);
        assert!(!infos[0].installed);
        assert!(infos[1].installed);
        assert_eq!(infos[1].date, "2020.06.02");
        assert!(!infos[2].installed);

        let _ = std::fs::remove_dir_all(&paths.root);
    }
}
