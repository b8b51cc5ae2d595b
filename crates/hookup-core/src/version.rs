//! Build identification shared by the CLI and the in-process host.

use serde::Serialize;
use std::fmt;

/// Crate version, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name, version and source commit of this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Set through `HOOKUP_BUILD_GIT_HASH` at compile time.
    pub git_hash: Option<&'static str>,
}

impl BuildInfo {
    #[must_use]
    pub const fn current() -> Self {
        Self {
            name: "hookup",
            version: VERSION,
            git_hash: option_env!("HOOKUP_BUILD_GIT_HASH"),
        }
    }

    /// Version string the in-process host reports, e.g. `hookup-chain/0.1.0`.
    #[must_use]
    pub fn host_version(&self) -> String {
        format!("{}-chain/{}", self.name, self.version)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)?;
        if let Some(hash) = self.git_hash {
            write!(f, " ({hash})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let info = BuildInfo {
            name: "hookup",
            version: "1.2.3",
            git_hash: None,
        };
        assert_eq!(info.to_string(), "hookup 1.2.3");

        let info = BuildInfo {
            git_hash: Some("abc123"),
            ..info
        };
        assert_eq!(info.to_string(), "hookup 1.2.3 (abc123)");
    }

    #[test]
    fn test_current_build() {
        let info = BuildInfo::current();
        assert_eq!(info.version, VERSION);
        assert!(info.to_string().starts_with("hookup "));
        assert_eq!(info.host_version(), format!("hookup-chain/{VERSION}"));
    }
}
