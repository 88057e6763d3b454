#![warn(clippy::pedantic)]

//! Version manager for the Protocol Buffers compiler.
//!
//! The library holds the version lifecycle engine used by the `pbvm` binary:
//! resolving the home directory layout, selecting and fetching release
//! assets, extracting them into `versions/`, and switching the active
//! version through the symlinks in `active/`.

pub mod config;
pub mod errors;
pub mod toolchain;
