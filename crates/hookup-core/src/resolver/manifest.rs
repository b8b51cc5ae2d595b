//! Package manifest `imports` field as a lazily built, memoized rewrite table.
//!
//! The table for a base URL is read from the nearest enclosing
//! `package.json` the first time it is needed and kept for the rest of the
//! process. Manifests are assumed not to change while the process runs.

use super::import_map::ImportMap;
use crate::specifier::file_url_to_path;
use hookup_util::fs::{is_dir, is_file, read_to_string_lossy};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};
use url::Url;

/// Manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// Condition keys accepted for object-valued `imports` targets, in preference order.
const IMPORT_CONDITIONS: &[&str] = &["import", "default", "node"];

/// Raw `imports` entries read from a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestImports {
    /// URL of the manifest file; relative targets resolve against it.
    pub manifest_url: Url,
    /// `(pattern, target)` pairs in manifest order.
    pub entries: Vec<(String, String)>,
}

/// Source of manifest `imports` fields.
pub trait ManifestReader: Send + Sync + fmt::Debug {
    /// Locate the manifest enclosing `base` and read its `imports` field.
    ///
    /// Returns `None` when there is no manifest or it declares no imports.
    fn read_imports(&self, base: &Url) -> Option<ManifestImports>;
}

/// Reads `package.json` from the filesystem, walking up from the base location.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestReader;

impl ManifestReader for FsManifestReader {
    fn read_imports(&self, base: &Url) -> Option<ManifestImports> {
        let start = file_url_to_path(base.as_str())?;
        let mut current = if is_dir(&start) {
            Some(start.as_path())
        } else {
            start.parent()
        };

        // The nearest manifest wins even without an imports field
        while let Some(dir) = current {
            let manifest = dir.join(MANIFEST_FILE);
            if is_file(&manifest) {
                return read_manifest_imports(&manifest);
            }
            current = dir.parent();
        }

        None
    }
}

fn read_manifest_imports(path: &Path) -> Option<ManifestImports> {
    let content = read_to_string_lossy(path).ok()?;
    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unparsable manifest");
            return None;
        }
    };

    let imports = value.get("imports")?.as_object()?;
    let entries = imports
        .iter()
        .filter_map(|(key, target)| Some((key.clone(), import_target(target)?)))
        .collect();

    Some(ManifestImports {
        manifest_url: Url::from_file_path(path).ok()?,
        entries,
    })
}

/// Pick a string target from a string or conditions object.
fn import_target(target: &Value) -> Option<String> {
    if let Some(s) = target.as_str() {
        return Some(s.to_string());
    }

    let conditions = target.as_object()?;
    IMPORT_CONDITIONS
        .iter()
        .find_map(|key| conditions.get(*key))
        .and_then(import_target)
}

/// Memoized per-base state. A missing map key means "not yet computed".
#[derive(Debug, Clone)]
enum CachedImports {
    /// No manifest or no `imports` field.
    Missing,
    Table(Arc<ImportMap>),
}

/// Per-base-URL cache of manifest-derived rewrite tables.
///
/// Concurrent first lookups for the same base may each read the manifest;
/// the first stored result is kept. Reads are pure, so the duplicate work is
/// harmless.
pub struct ImportMapCache {
    reader: Box<dyn ManifestReader>,
    entries: RwLock<HashMap<String, CachedImports>>,
}

impl fmt::Debug for ImportMapCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportMapCache")
            .field("reader", &self.reader)
            .field("entries", &self.len())
            .finish()
    }
}

impl Default for ImportMapCache {
    fn default() -> Self {
        Self::new(FsManifestReader)
    }
}

impl ImportMapCache {
    /// Create a cache backed by `reader`.
    #[must_use]
    pub fn new(reader: impl ManifestReader + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Rewrite table for `base`, reading the manifest on first use.
    pub fn get(&self, base: &Url) -> Option<Arc<ImportMap>> {
        let key = base.as_str();

        if let Some(cached) = self.read_entries().get(key) {
            trace!(base = key, "manifest imports cache hit");
            return match cached {
                CachedImports::Missing => None,
                CachedImports::Table(table) => Some(Arc::clone(table)),
            };
        }

        let computed = match self.reader.read_imports(base) {
            Some(imports) => {
                debug!(
                    base = key,
                    manifest = %imports.manifest_url,
                    rules = imports.entries.len(),
                    "loaded manifest imports"
                );
                CachedImports::Table(Arc::new(ImportMap::from_pairs(
                    imports.entries,
                    Some(&imports.manifest_url),
                )))
            }
            None => {
                debug!(base = key, "no manifest imports");
                CachedImports::Missing
            }
        };

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.entry(key.to_string()).or_insert(computed) {
            CachedImports::Missing => None,
            CachedImports::Table(table) => Some(Arc::clone(table)),
        }
    }

    /// Number of memoized base URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether nothing has been memoized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, CachedImports>> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
