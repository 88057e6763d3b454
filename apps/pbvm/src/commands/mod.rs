//! Command modules for the pbvm CLI.
//!
//! ## Version Management Commands
//!
//! - [`install`] - Install and activate a version
//! - [`activate`] - Activate an installed version
//! - [`delete`] - Remove an installed version
//! - [`list_local`] - List installed versions
//! - [`list_remote`] - List published versions
//! - [`run`] - Run a command under a version
//!
//! ## Other Commands
//!
//! - [`version`] - Display version information
//! - [`completion`] - Generate shell completion scripts

pub mod activate;
pub mod completion;
pub mod delete;
pub mod install;
pub mod list_local;
pub mod list_remote;
pub mod run;
mod table;
pub mod version;
