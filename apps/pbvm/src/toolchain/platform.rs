//! Platform labels for asset matching.
//!
//! Release assets are named `protoc-{version}-{os}-{arch}.zip`. The OS label
//! is taken verbatim from the running process; the architecture label goes
//! through a small alias table so that Rust's names match the ones used in
//! release asset names.

use std::fmt;

/// Architecture aliases: Rust's `std::env::consts::ARCH` name on the left,
/// the label used in asset names on the right.
const ARCH_ALIASES: [(&str, &str); 2] = [("x86", "x86_32"), ("x86_64", "x86_64")];

/// Maps a raw architecture name to its asset label.
///
/// Names missing from the alias table pass through unchanged.
#[must_use]
pub fn get_arch(raw: &str) -> &str {
    ARCH_ALIASES
        .iter()
        .find(|(from, _)| *from == raw)
        .map_or(raw, |(_, to)| to)
}

/// The OS and architecture labels of a platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Returns the labels of the running platform.
    #[must_use = "returns the platform without side effects"]
    pub fn detect() -> Self {
        Self::new(std::env::consts::OS, get_arch(std::env::consts::ARCH))
    }

    /// Creates a platform from explicit labels.
    #[must_use = "returns the platform without side effects"]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Returns the OS label, e.g. `linux`.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Returns the architecture label, e.g. `x86_64`.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
