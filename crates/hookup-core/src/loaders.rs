//! Synthetic content loaders keyed by import-attribute `type`.
//!
//! A loader turns raw file content into module source text that
//! default-exports it. `buffer` is special: it never fetches content and
//! instead emits code that reads the file at evaluation time.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Content type of the built-in text loader.
pub const TEXT: &str = "text";

/// Content type of the built-in buffer loader.
pub const BUFFER: &str = "buffer";

/// Custom transform: raw content (absent for `buffer`) and file path to source text.
pub type LoaderFn = Arc<dyn Fn(Option<&[u8]>, &Path) -> String + Send + Sync>;

/// A loader entry as declared in configuration.
#[derive(Clone)]
pub enum LoaderSpec {
    /// Use the built-in loader for this content type.
    Builtin,
    /// Use a caller-supplied transform.
    Custom(LoaderFn),
    /// Anything else; rejected at registration.
    Invalid(String),
}

impl fmt::Debug for LoaderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("Builtin"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Invalid(raw) => f.debug_tuple("Invalid").field(raw).finish(),
        }
    }
}

impl<'de> Deserialize<'de> for LoaderSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Validation is deferred to registration so the error names the loader
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(true) => Self::Builtin,
            other => Self::Invalid(other.to_string()),
        })
    }
}

/// Declared loaders by content type.
pub type LoaderOptions = BTreeMap<String, LoaderSpec>;

#[derive(Clone)]
enum Transform {
    Text,
    Buffer,
    Custom(LoaderFn),
}

/// Validated loaders, ready to serve load requests.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: BTreeMap<String, Transform>,
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.loaders.keys()).finish()
    }
}

impl LoaderRegistry {
    /// Validate declared loaders.
    ///
    /// `true` is only accepted for a content type with a built-in loader.
    pub fn from_options(options: LoaderOptions) -> Result<Self> {
        let mut loaders = BTreeMap::new();

        for (kind, spec) in options {
            let transform = match spec {
                LoaderSpec::Custom(f) => Transform::Custom(f),
                LoaderSpec::Builtin if kind == TEXT => Transform::Text,
                LoaderSpec::Builtin if kind == BUFFER => Transform::Buffer,
                LoaderSpec::Builtin | LoaderSpec::Invalid(_) => {
                    return Err(Error::InvalidLoader { kind });
                }
            };
            loaders.insert(kind, transform);
        }

        Ok(Self { loaders })
    }

    /// Whether a loader is registered for `kind`.
    #[must_use]
    pub fn handles(&self, kind: &str) -> bool {
        self.loaders.contains_key(kind)
    }

    /// Whether the loader for `kind` needs the file content fetched first.
    #[must_use]
    pub fn needs_source(kind: &str) -> bool {
        kind != BUFFER
    }

    /// Produce module source for `kind`. Returns `None` for unregistered types.
    #[must_use]
    pub fn transform(&self, kind: &str, content: Option<&[u8]>, path: &Path) -> Option<String> {
        Some(match self.loaders.get(kind)? {
            Transform::Text => text_module(content.unwrap_or_default()),
            Transform::Buffer => buffer_module(path),
            Transform::Custom(f) => f(content, path),
        })
    }
}

/// Module source default-exporting `content` decoded as UTF-8.
#[must_use]
pub fn text_module(content: &[u8]) -> String {
    let text = String::from_utf8_lossy(content);
    format!("export default {}", json_string(&text))
}

/// Module source that reads `path` from disk when evaluated.
#[must_use]
pub fn buffer_module(path: &Path) -> String {
    format!(
        "import {{ readFileSync }} from 'fs';export default readFileSync({})",
        json_string(&path.to_string_lossy())
    )
}

fn json_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
