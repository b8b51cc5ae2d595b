use std::path::PathBuf;
use thiserror::Error;

/// Core error type for hookup operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The host module system has no hook-registration capability.
    #[error("module hooks are not supported by this host ({version})")]
    UnsupportedHost { version: String },

    /// A loader entry is neither a built-in flag nor a callable.
    #[error("loader \"{kind}\" needs to be a function or `true` for a built-in loader")]
    InvalidLoader { kind: String },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot find module '{specifier}' imported from {parent}")]
    ModuleNotFound { specifier: String, parent: String },

    #[error("Invalid module URL: {url}")]
    InvalidUrl { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(specifier: impl Into<String>, parent: Option<&str>) -> Self {
        Self::ModuleNotFound {
            specifier: specifier.into(),
            parent: parent.unwrap_or("<root>").to_string(),
        }
    }
}

/// Result alias used across hookup.
pub type Result<T, E = Error> = std::result::Result<T, E>;
