//! Composition of the explicit and manifest-derived import maps.

use super::import_map::ImportMap;
use super::manifest::ImportMapCache;
use super::ResolutionKind;
use std::borrow::Cow;
use std::sync::Arc;
use url::Url;

/// Rewrites specifiers through the active import maps.
///
/// The explicit map is consulted first; the manifest map for `base` only
/// when the explicit map has no matching rule.
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    explicit: Option<ImportMap>,
    manifest: Option<(Url, Arc<ImportMapCache>)>,
}

impl Rewriter {
    /// A rewriter with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit import map.
    #[must_use]
    pub fn with_explicit(mut self, map: ImportMap) -> Self {
        self.explicit = (!map.is_empty()).then_some(map);
        self
    }

    /// Use the manifest `imports` field enclosing `base`, read through `cache`.
    #[must_use]
    pub fn with_manifest(mut self, base: Url, cache: Arc<ImportMapCache>) -> Self {
        self.manifest = Some((base, cache));
        self
    }

    /// Whether any rule source is configured.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.explicit.is_some() || self.manifest.is_some()
    }

    /// Rewrite through the first map with a matching rule.
    #[must_use]
    pub fn rewrite<'a>(&self, specifier: &'a str, kind: ResolutionKind) -> Cow<'a, str> {
        if let Some(map) = &self.explicit {
            let out = map.rewrite(specifier, kind);
            if let Cow::Owned(_) = out {
                return out;
            }
        }

        if let Some((base, cache)) = &self.manifest {
            if let Some(map) = cache.get(base) {
                if let Cow::Owned(out) = map.rewrite(specifier, kind) {
                    return Cow::Owned(out);
                }
            }
        }

        Cow::Borrowed(specifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::manifest::{ManifestImports, ManifestReader};

    #[derive(Debug)]
    struct FixedReader(Vec<(String, String)>);

    impl ManifestReader for FixedReader {
        fn read_imports(&self, _base: &Url) -> Option<ManifestImports> {
            Some(ManifestImports {
                manifest_url: Url::parse("file:///pkg/package.json").unwrap(),
                entries: self.0.clone(),
            })
        }
    }

    fn manifest_rewriter(explicit: &[(&str, &str)]) -> Rewriter {
        let cache = Arc::new(ImportMapCache::new(FixedReader(vec![
            ("#db".to_string(), "./src/db.js".to_string()),
            ("#cfg".to_string(), "./src/cfg.js".to_string()),
        ])));
        Rewriter::new()
            .with_explicit(ImportMap::from_pairs(explicit.iter().copied(), None))
            .with_manifest(Url::parse("file:///pkg/main.js").unwrap(), cache)
    }

    #[test]
    fn test_empty_rewriter_is_inactive() {
        let rewriter = Rewriter::new().with_explicit(ImportMap::new());
        assert!(!rewriter.is_active());
        assert_eq!(rewriter.rewrite("#db", ResolutionKind::Import), "#db");
    }

    #[test]
    fn test_explicit_shadows_manifest() {
        let rewriter = manifest_rewriter(&[("#db", "file:///mock/db.js")]);
        assert_eq!(
            rewriter.rewrite("#db", ResolutionKind::Import),
            "file:///mock/db.js"
        );
    }

    #[test]
    fn test_falls_back_to_manifest() {
        let rewriter = manifest_rewriter(&[("#db", "file:///mock/db.js")]);
        assert_eq!(
            rewriter.rewrite("#cfg", ResolutionKind::Import),
            "file:///pkg/src/cfg.js"
        );
        assert_eq!(rewriter.rewrite("#none", ResolutionKind::Import), "#none");
    }
}
