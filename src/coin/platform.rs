//! Target platform detection.
//!
//! Binary names, install folders and release archives all differ between
//! ARM boards, desktop Linux and Windows, so every path lookup takes a
//! [`Platform`] explicitly rather than consulting `cfg!` deep inside the
//! accessors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platforms the wallet tooling ships releases for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// 32/64-bit ARM Linux (Raspberry Pi and similar)
    Arm,
    /// x86_64 Linux and other Unix-likes
    Linux,
    /// 64-bit Windows
    Windows,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(any(target_arch = "arm", target_arch = "aarch64")) {
            Platform::Arm
        } else {
            Platform::Linux
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Append the platform executable suffix to a binary stem
    ///
    /// ```
    /// use walletkit::coin::Platform;
    ///
    /// assert_eq!(Platform::Linux.executable_name("divid"), "divid");
    /// assert_eq!(Platform::Windows.executable_name("divid"), "divid.exe");
    /// ```
    pub fn executable_name(&self, stem: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", stem),
            Platform::Arm | Platform::Linux => stem.to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Arm => "arm",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_suffix_only_on_windows() {
        assert_eq!(Platform::Arm.executable_name("phore-cli"), "phore-cli");
        assert_eq!(Platform::Linux.executable_name("phore-cli"), "phore-cli");
        assert_eq!(Platform::Windows.executable_name("phore-cli"), "phore-cli.exe");
    }

    #[test]
    fn test_current_platform_matches_target() {
        let platform = Platform::current();
        if cfg!(target_os = "windows") {
            assert_eq!(platform, Platform::Windows);
        } else {
            assert!(!platform.is_windows());
        }
    }
}
