//! Specifier rewriting for the resolve hook.
//!
//! - `import_map`: exact and wildcard rewrite rules
//! - `manifest`: lazily read, memoized `package.json` imports tables
//! - `rewriter`: explicit map first, manifest map second
//! - `infer`: extension and directory index inference

mod import_map;
mod infer;
mod manifest;
mod rewriter;

pub use import_map::{ImportMap, RewriteRule, WILDCARD};
pub use infer::{
    infer, looks_like_file_reference, InferOptions, INDEX_FILE, INTERNAL_MARKER,
    STANDARD_EXTENSIONS,
};
pub use manifest::{
    FsManifestReader, ImportMapCache, ManifestImports, ManifestReader, MANIFEST_FILE,
};
pub use rewriter::Rewriter;

use std::collections::BTreeSet;

/// Condition that marks a require-style resolution.
pub const REQUIRE_CONDITION: &str = "require";

/// Whether a resolution comes from `import` or `require`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionKind {
    /// ESM import
    #[default]
    Import,
    /// CJS require; has its own extension and directory rules
    Require,
}

impl ResolutionKind {
    /// Derive the kind from an active condition set.
    #[must_use]
    pub fn from_conditions(conditions: &BTreeSet<String>) -> Self {
        if conditions.contains(REQUIRE_CONDITION) {
            Self::Require
        } else {
            Self::Import
        }
    }
}

impl std::fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Require => write!(f, "require"),
        }
    }
}
