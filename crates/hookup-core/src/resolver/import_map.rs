//! Import-map rewrite tables.
//!
//! Rules come in two shapes, fixed when the table is built:
//! - exact: `"#db"` → `"./src/db.js"`, matched by direct key lookup
//! - wildcard: `"#lib/*.js"` → `"./src/lib/*.mjs"`, matched by prefix/suffix
//!
//! Exact rules are consulted first, then wildcard rules in insertion order.

use super::ResolutionKind;
use crate::specifier::file_url_to_path;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Wildcard marker in patterns and replacements.
pub const WILDCARD: char = '*';

/// A single rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteRule {
    /// Matches iff the specifier equals `pattern`.
    Exact { pattern: String, replacement: String },
    /// Matches iff the specifier starts with `prefix` and ends with `suffix`
    /// without the two overlapping.
    Wildcard {
        prefix: String,
        suffix: String,
        replacement_prefix: String,
        replacement_suffix: String,
    },
}

impl RewriteRule {
    /// Build a rule. It is a wildcard rule only when both sides carry the marker.
    #[must_use]
    pub fn new(pattern: &str, replacement: &str) -> Self {
        match (
            pattern.split_once(WILDCARD),
            replacement.split_once(WILDCARD),
        ) {
            (Some((prefix, suffix)), Some((replacement_prefix, replacement_suffix))) => {
                Self::Wildcard {
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                    replacement_prefix: replacement_prefix.to_string(),
                    replacement_suffix: replacement_suffix.to_string(),
                }
            }
            _ => Self::Exact {
                pattern: pattern.to_string(),
                replacement: replacement.to_string(),
            },
        }
    }

    /// Apply the rule, returning the rewritten specifier on match.
    #[must_use]
    pub fn apply(&self, specifier: &str) -> Option<String> {
        match self {
            Self::Exact {
                pattern,
                replacement,
            } => (specifier == pattern).then(|| replacement.clone()),
            Self::Wildcard {
                prefix,
                suffix,
                replacement_prefix,
                replacement_suffix,
            } => {
                let middle = specifier.strip_prefix(prefix.as_str())?;
                let middle = middle.strip_suffix(suffix.as_str())?;
                Some(format!("{replacement_prefix}{middle}{replacement_suffix}"))
            }
        }
    }

    /// Resolve relative replacement targets (`./`, `../`) against `base`.
    fn anchored(self, base: &Url) -> Self {
        match self {
            Self::Exact {
                pattern,
                replacement,
            } => Self::Exact {
                pattern,
                replacement: anchor(replacement, base),
            },
            Self::Wildcard {
                prefix,
                suffix,
                replacement_prefix,
                replacement_suffix,
            } => Self::Wildcard {
                prefix,
                suffix,
                replacement_prefix: anchor(replacement_prefix, base),
                replacement_suffix,
            },
        }
    }
}

fn is_relative_target(target: &str) -> bool {
    target.starts_with("./") || target.starts_with("../") || target == "." || target == ".."
}

fn anchor(target: String, base: &Url) -> String {
    if !is_relative_target(&target) {
        return target;
    }
    match base.join(&target) {
        Ok(url) => url.to_string(),
        Err(_) => target,
    }
}

/// Ordered rewrite table.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    rules: Vec<RewriteRule>,
    /// Exact pattern -> index into `rules`.
    exact: HashMap<String, usize>,
}

impl ImportMap {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(pattern, replacement)` pairs in order.
    ///
    /// With a `base`, relative replacement targets are resolved against it
    /// once, here, rather than on every lookup.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I, base: Option<&Url>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Self::new();
        for (pattern, replacement) in pairs {
            let rule = RewriteRule::new(pattern.as_ref(), replacement.as_ref());
            map.push(match base {
                Some(base) => rule.anchored(base),
                None => rule,
            });
        }
        map
    }

    /// Add a rule. A later exact rule for an existing pattern never shadows
    /// the earlier one.
    pub fn insert(&mut self, pattern: &str, replacement: &str) {
        self.push(RewriteRule::new(pattern, replacement));
    }

    fn push(&mut self, rule: RewriteRule) {
        if let RewriteRule::Exact { pattern, .. } = &rule {
            if self.exact.contains_key(pattern) {
                return;
            }
            self.exact.insert(pattern.clone(), self.rules.len());
        }
        self.rules.push(rule);
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the first rule matching `specifier` and return its output.
    #[must_use]
    pub fn lookup(&self, specifier: &str) -> Option<String> {
        if let Some(&idx) = self.exact.get(specifier) {
            return self.rules[idx].apply(specifier);
        }

        self.rules
            .iter()
            .filter(|rule| matches!(rule, RewriteRule::Wildcard { .. }))
            .find_map(|rule| rule.apply(specifier))
    }

    /// Rewrite `specifier`, passing it through unchanged when no rule matches.
    ///
    /// For require-style resolution a `file:` URL result is converted back to
    /// a filesystem path.
    #[must_use]
    pub fn rewrite<'a>(&self, specifier: &'a str, kind: ResolutionKind) -> Cow<'a, str> {
        let Some(rewritten) = self.lookup(specifier) else {
            return Cow::Borrowed(specifier);
        };

        debug!(specifier, rewritten = %rewritten, "import map rewrite");

        if kind == ResolutionKind::Require {
            if let Some(path) = file_url_to_path(&rewritten) {
                return Cow::Owned(path.to_string_lossy().into_owned());
            }
        }

        Cow::Owned(rewritten)
    }
}
