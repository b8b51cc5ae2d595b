//! Module locations as both filesystem paths and `file:` URLs.
//!
//! A [`Specifier`] wraps the path component of a resolved URL. All
//! operations return new values; probing the filesystem is kept separate
//! from computing candidate paths so resolution order stays declarative.

use hookup_util::fs;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// A resolvable module location.
///
/// File-style specifiers hold an absolute URL path (`/dir/mod.js`). Anything
/// that could not be resolved to a `file:` URL is kept verbatim and treated
/// as opaque: it never matches a filesystem probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specifier {
    path: String,
}

impl Specifier {
    /// Wrap an already-normalized path string.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve `raw` against an optional `base`.
    ///
    /// Filesystem-absolute inputs (either `raw` or `base`) are converted to
    /// `file:` URLs before resolution. Inputs that do not resolve to a `file:`
    /// URL (bare names without a base, `node:` and other schemes) are kept
    /// unchanged. Never fails.
    #[must_use]
    pub fn from_raw(raw: &str, base: Option<&str>) -> Self {
        let resolved = if is_absolute_path(raw) {
            Url::from_file_path(raw).ok()
        } else {
            match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(url::ParseError::RelativeUrlWithoutBase) => base
                    .and_then(base_url)
                    .and_then(|base| base.join(raw).ok()),
                Err(_) => None,
            }
        };

        match resolved {
            Some(url) if url.scheme() == "file" => Self::new(url.path()),
            _ => Self::new(raw),
        }
    }

    /// The internal path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Whether this specifier failed to resolve to a `file:` location.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        !self.path.starts_with('/')
    }

    /// URL form: `file://` prefixed for file-style specifiers, verbatim otherwise.
    #[must_use]
    pub fn url(&self) -> String {
        if self.is_opaque() {
            self.path.clone()
        } else {
            format!("file://{}", self.path)
        }
    }

    /// Filesystem form, with percent-encoding removed.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        if self.is_opaque() {
            return PathBuf::from(&self.path);
        }

        Url::parse(&self.url())
            .ok()
            .and_then(|url| url.to_file_path().ok())
            .unwrap_or_else(|| PathBuf::from(&self.path))
    }

    /// Join `parts` onto the directory containing this specifier.
    ///
    /// Path-join semantics: `.` and `..` segments are collapsed, nothing is
    /// checked on disk.
    #[must_use]
    pub fn join<I, S>(&self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = dirname(&self.path).to_string();
        for part in parts {
            let part = part.as_ref();
            if part.is_empty() {
                continue;
            }
            joined.push('/');
            joined.push_str(part);
        }

        Self::new(normalize(&joined))
    }

    /// Concatenate `suffix` verbatim onto the path.
    #[must_use]
    pub fn append(&self, suffix: &str) -> Self {
        Self::new(format!("{}{suffix}", self.path))
    }

    /// Append the first extension for which `path + extension` is an existing file.
    ///
    /// Candidates are de-duplicated in first-seen order and empty entries are
    /// skipped. Returns a clone of `self` when no candidate exists.
    #[must_use]
    pub fn find_extension<'a, I>(&self, candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: Vec<&str> = Vec::new();

        for ext in candidates {
            if ext.is_empty() || seen.contains(&ext) {
                continue;
            }
            seen.push(ext);

            let candidate = self.append(ext);
            if candidate.is_file() {
                return candidate;
            }
        }

        self.clone()
    }

    /// Extension of the last path segment, including the leading dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        extname(&self.path)
    }

    /// Whether the path names an existing directory. Never fails.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        !self.is_opaque() && fs::is_dir(&self.path())
    }

    /// Whether the path names an existing regular file. Never fails.
    #[must_use]
    pub fn is_file(&self) -> bool {
        !self.is_opaque() && fs::is_file(&self.path())
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Extension of the last segment of a path or URL (`".mjs"` for
/// `file:///a/b.mjs?x=1`). Dotfiles such as `.env` have no extension.
#[must_use]
pub fn extname(path_or_url: &str) -> Option<&str> {
    let end = path_or_url.find(['?', '#']).unwrap_or(path_or_url.len());
    let trimmed = &path_or_url[..end];
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);

    match segment.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&segment[idx..]),
    }
}

/// Convert a `file:` URL to a filesystem path.
#[must_use]
pub fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    if parsed.scheme() != "file" {
        return None;
    }
    parsed.to_file_path().ok()
}

/// Whether `spec` is a filesystem-absolute path on this platform or in posix form.
pub(crate) fn is_absolute_path(spec: &str) -> bool {
    spec.starts_with('/') || Path::new(spec).is_absolute()
}

fn base_url(base: &str) -> Option<Url> {
    if is_absolute_path(base) {
        Url::from_file_path(base).ok()
    } else {
        Url::parse(base).ok()
    }
}

fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Collapse `.`/`..` segments and repeated slashes in a posix path.
fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.len() > 1 && path.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = segments.join("/");
    if absolute {
        out.insert(0, '/');
    }
    if out.is_empty() {
        out.push('.');
    }
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}
