//! Version lifecycle engine.
//!
//! ## Module Structure
//!
//! - [`paths`] - Home directory layout
//! - [`platform`] - OS and architecture labels used for asset matching
//! - [`asset`] - Choosing the release asset for the running platform
//! - [`release`] - GitHub releases API client
//! - [`download`] - Streaming HTTP download into the cache
//! - [`archive`] - ZIP extraction with path traversal checks
//! - [`install`] - Installing, listing and deleting versions
//! - [`activation`] - Switching the active version
//! - [`date`] - Date formatting for listings

pub mod activation;
pub mod archive;
pub mod asset;
pub mod date;
pub mod download;
pub mod install;
pub mod paths;
pub mod platform;
pub mod release;

pub use activation::{
    activate_version, active_version, deactivate, get_active_version, is_active_version,
};
pub use archive::extract_zip;
pub use asset::{is_suitable_asset, select_asset};
pub use download::download_file;
pub use install::{
    InstalledVersion, delete_version, download_version, install_archive, is_installed_version,
    list_installed_versions, validate_version,
};
pub use paths::HomePaths;
pub use platform::{Platform, get_arch};
pub use release::{Release, ReleaseAsset, ReleaseSource};
