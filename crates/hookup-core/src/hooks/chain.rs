//! In-process host: an ordered hook chain over default filesystem handlers.

use super::{
    Hooks, LoadContext, LoadHook, LoadOutput, ModuleHost, ModuleSource, NextLoad, NextResolve,
    ResolveContext, ResolveHook, ResolveOutput,
};
use crate::specifier::{extname, is_absolute_path};
use crate::version::BuildInfo;
use crate::{Error, Result};
use hookup_util::fs::is_file;
use std::sync::Arc;
use tracing::trace;
use url::Url;

/// Hook chain with default filesystem resolution and loading at the end.
///
/// Hooks registered later run first. The default resolver only accepts
/// existing files (no extension or directory guessing) and passes non-`file:`
/// URLs through; the default loader reads files from disk and refuses URLs
/// that still carry a query string.
pub struct HookChain {
    version: String,
    hooks_supported: bool,
    resolvers: Vec<Arc<dyn ResolveHook>>,
    loaders: Vec<Arc<dyn LoadHook>>,
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("version", &self.version)
            .field("hooks_supported", &self.hooks_supported)
            .field("resolvers", &self.resolvers.len())
            .field("loaders", &self.loaders.len())
            .finish()
    }
}

impl Default for HookChain {
    fn default() -> Self {
        Self::new()
    }
}

impl HookChain {
    /// A chain that accepts hook registration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: BuildInfo::current().host_version(),
            hooks_supported: true,
            resolvers: Vec::new(),
            loaders: Vec::new(),
        }
    }

    /// A chain modelling a host without hook registration.
    #[must_use]
    pub fn without_hook_support(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            hooks_supported: false,
            ..Self::new()
        }
    }

    /// Number of registered resolve hooks.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    /// Number of registered load hooks.
    #[must_use]
    pub fn loader_count(&self) -> usize {
        self.loaders.len()
    }

    /// Resolve `specifier` through every registered hook.
    pub fn resolve(&self, specifier: &str, context: &ResolveContext) -> Result<ResolveOutput> {
        self.resolve_from(self.resolvers.len(), specifier, context)
    }

    /// Load `url` through every registered hook.
    pub fn load(&self, url: &str, context: &LoadContext) -> Result<LoadOutput> {
        self.load_from(self.loaders.len(), url, context)
    }

    fn resolve_from(
        &self,
        depth: usize,
        specifier: &str,
        context: &ResolveContext,
    ) -> Result<ResolveOutput> {
        let Some(idx) = depth.checked_sub(1) else {
            return default_resolve(specifier, context);
        };

        let next = NextResolve::new(move |specifier: &str, context: &ResolveContext| {
            self.resolve_from(idx, specifier, context)
        });
        self.resolvers[idx].resolve(specifier, context, next)
    }

    fn load_from(&self, depth: usize, url: &str, context: &LoadContext) -> Result<LoadOutput> {
        let Some(idx) = depth.checked_sub(1) else {
            return default_load(url, context);
        };

        let next = NextLoad::new(move |url: &str, context: &LoadContext| {
            self.load_from(idx, url, context)
        });
        self.loaders[idx].load(url, context, next)
    }
}

impl ModuleHost for HookChain {
    fn version(&self) -> &str {
        &self.version
    }

    fn supports_hooks(&self) -> bool {
        self.hooks_supported
    }

    fn register_hooks(&mut self, hooks: Hooks) {
        if let Some(resolve) = hooks.resolve {
            self.resolvers.push(resolve);
        }
        if let Some(load) = hooks.load {
            self.loaders.push(load);
        }
    }
}

/// Format hint from a file extension.
fn format_for(url: &str) -> &'static str {
    match extname(url) {
        Some(".cjs") => "commonjs",
        Some(".json") => "json",
        Some(".wasm") => "wasm",
        _ => "module",
    }
}

fn default_resolve(specifier: &str, context: &ResolveContext) -> Result<ResolveOutput> {
    let parent = context.parent_url.as_deref();

    let url = if is_absolute_path(specifier) {
        Url::from_file_path(specifier).ok()
    } else {
        match Url::parse(specifier) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                // Bare names are package imports; package lookup is not ours
                let relative = specifier.starts_with("./")
                    || specifier.starts_with("../")
                    || specifier == "."
                    || specifier == "..";
                parent
                    .filter(|_| relative)
                    .and_then(|parent| Url::parse(parent).ok())
                    .and_then(|parent| parent.join(specifier).ok())
            }
            Err(_) => None,
        }
    };

    let Some(url) = url else {
        return Err(Error::not_found(specifier, parent));
    };

    if url.scheme() != "file" {
        trace!(url = %url, "passing through non-file url");
        return Ok(ResolveOutput::new(url.as_str()).with_format("builtin"));
    }

    match url.to_file_path() {
        Ok(path) if is_file(&path) => {
            let format = format_for(url.path());
            Ok(ResolveOutput::new(url.as_str()).with_format(format))
        }
        _ => Err(Error::not_found(specifier, parent)),
    }
}

fn default_load(url: &str, context: &LoadContext) -> Result<LoadOutput> {
    let parsed = Url::parse(url).map_err(|_| Error::InvalidUrl {
        url: url.to_string(),
    })?;

    if parsed.scheme() != "file" {
        return Ok(LoadOutput {
            source: None,
            format: "builtin".to_string(),
            short_circuit: true,
        });
    }

    if parsed.query().is_some() {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
        });
    }

    let path = parsed.to_file_path().map_err(|()| Error::InvalidUrl {
        url: url.to_string(),
    })?;
    let bytes = std::fs::read(&path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::not_found(url, None)
        } else {
            Error::Io(err)
        }
    })?;

    let format = context
        .format
        .clone()
        .unwrap_or_else(|| format_for(parsed.path()).to_string());
    let source = match format.as_str() {
        "module" | "commonjs" | "json" | "javascript" | "text" => {
            ModuleSource::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => ModuleSource::Bytes(bytes),
    };

    Ok(LoadOutput {
        source: Some(source),
        format,
        short_circuit: true,
    })
}
