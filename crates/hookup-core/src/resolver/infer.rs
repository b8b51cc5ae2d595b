//! Extension and directory inference for file-style specifiers.
//!
//! Given `./pages` imported from `file:///app/main.mjs`, tries in order:
//! 1. `./pages` as-is if it is a file
//! 2. `./pages` + importer extension (`.mjs`), then the configured list
//! 3. if the result is a directory, `./pages/index` with the same probe

use crate::specifier::{extname, Specifier};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Default extension candidates.
pub const STANDARD_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs"];

/// Index file appended to directory specifiers, before extension probing.
pub const INDEX_FILE: &str = "index";

/// Package-internal-root marker (`#name` specifiers).
pub const INTERNAL_MARKER: char = '#';

/// What to infer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferOptions {
    /// Append `/index` (plus extension) to directory specifiers.
    pub directories: bool,
    /// Extension candidates; `None` disables extension inference.
    pub extensions: Option<Vec<String>>,
}

impl InferOptions {
    /// Whether any inference is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.directories || self.extensions.is_some()
    }
}

/// Whether `specifier` refers to a file the way a relative, root-relative,
/// package-internal or `file:` import does. Bare package names do not.
#[must_use]
pub fn looks_like_file_reference(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/')
        || specifier.starts_with(INTERNAL_MARKER)
        || specifier.starts_with("file:")
}

/// Split a trailing `?query` or `#fragment` off a file-style specifier.
fn split_suffix(specifier: &str) -> (&str, &str) {
    match specifier.find(|c: char| c == '?' || c == '#') {
        Some(idx) => specifier.split_at(idx),
        None => (specifier, ""),
    }
}

/// Infer extension and directory index for `specifier`.
///
/// Returns the specifier unchanged when inference does not apply: disabled,
/// bare names, `#` specifiers that no import map rewrote, and anything that
/// does not resolve to a `file:` location. Otherwise returns the URL form of
/// the final candidate, whether or not it exists; final existence checks
/// belong to the next resolver. A query or fragment is carried over to the
/// result.
#[must_use]
pub fn infer<'a>(
    specifier: &'a str,
    parent_url: Option<&str>,
    options: &InferOptions,
) -> Cow<'a, str> {
    if !options.is_enabled()
        || !looks_like_file_reference(specifier)
        || specifier.starts_with(INTERNAL_MARKER)
    {
        return Cow::Borrowed(specifier);
    }

    let (path, suffix) = split_suffix(specifier);
    let mut candidate = Specifier::from_raw(path, parent_url);
    if candidate.is_opaque() {
        return Cow::Borrowed(specifier);
    }

    let parent_ext = parent_url.and_then(extname);

    if let Some(extensions) = &options.extensions {
        if !candidate.is_file() {
            trace!(path = %candidate, "probing extensions");
            candidate = candidate.find_extension(
                parent_ext
                    .into_iter()
                    .chain(extensions.iter().map(String::as_str)),
            );
        }
    }

    if options.directories && candidate.is_dir() {
        let index = if candidate.as_str().ends_with('/') {
            candidate.append(INDEX_FILE)
        } else {
            candidate.append(&format!("/{INDEX_FILE}"))
        };
        trace!(path = %index, "probing directory index");

        candidate = match &options.extensions {
            Some(extensions) => index.find_extension(
                parent_ext
                    .into_iter()
                    .chain(extensions.iter().map(String::as_str)),
            ),
            None => index.find_extension(
                parent_ext
                    .into_iter()
                    .chain(STANDARD_EXTENSIONS.iter().copied()),
            ),
        };
    }

    let mut url = candidate.url();
    url.push_str(suffix);
    debug!(specifier, url = %url, "inferred module location");
    Cow::Owned(url)
}
