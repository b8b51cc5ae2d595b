//! The resolve and load middleware, and their registration with a host.

use super::{
    Hooks, LoadContext, LoadHook, LoadOutput, ModuleHost, ModuleSource, NextLoad, NextResolve,
    ResolveContext, ResolveHook, ResolveOutput,
};
use crate::config::{HookupConfig, ResolveOptions};
use crate::loaders::{LoaderOptions, LoaderRegistry};
use crate::resolver::{infer, ImportMap, ImportMapCache, InferOptions, Rewriter};
use crate::specifier::file_url_to_path;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, trace};

/// Marker of third-party dependency trees.
const DEPENDENCY_DIR: &str = "/node_modules/";

fn ensure_hooks(host: &dyn ModuleHost) -> Result<()> {
    if host.supports_hooks() {
        Ok(())
    } else {
        Err(Error::UnsupportedHost {
            version: host.version().to_string(),
        })
    }
}

/// Split `value` at its first `?`.
fn split_search(value: &str) -> (&str, &str) {
    match value.find('?') {
        Some(idx) => value.split_at(idx),
        None => (value, ""),
    }
}

/// Resolve middleware: query handling, import-map rewrite, then inference.
#[derive(Debug, Clone)]
pub struct RewriteResolver {
    infer: InferOptions,
    handle_search: bool,
    rewriter: Rewriter,
}

impl RewriteResolver {
    #[must_use]
    pub fn new(options: &ResolveOptions, rewriter: Rewriter) -> Self {
        Self {
            infer: options.infer_options(),
            handle_search: options.handle_search,
            rewriter,
        }
    }

    /// Rewriting only applies to the application's own module graph, and
    /// never to `require()`.
    fn should_rewrite(context: &ResolveContext) -> bool {
        let in_dependency = context
            .parent_url
            .as_deref()
            .is_some_and(|parent| parent.contains(DEPENDENCY_DIR));
        !in_dependency && !context.is_require()
    }
}

impl ResolveHook for RewriteResolver {
    fn resolve(
        &self,
        specifier: &str,
        context: &ResolveContext,
        next: NextResolve<'_>,
    ) -> Result<ResolveOutput> {
        let (specifier, search) = if self.handle_search {
            split_search(specifier)
        } else {
            (specifier, "")
        };

        let mut output = if Self::should_rewrite(context) {
            let rewritten = self.rewriter.rewrite(specifier, context.kind());
            let inferred = infer(&rewritten, context.parent_url.as_deref(), &self.infer);
            if inferred != specifier {
                debug!(specifier, resolved = %inferred, "rewrote specifier");
            }
            next.call(&inferred, context)?
        } else {
            trace!(specifier, "rewriting skipped");
            next.call(specifier, context)?
        };

        if !search.is_empty() {
            // Query stays visible to the importing module's meta URL
            output.url.push_str(search);
        }
        Ok(output)
    }
}

/// Load middleware removing the query suffix before the next loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStripLoader;

impl LoadHook for QueryStripLoader {
    fn load(&self, url: &str, context: &LoadContext, next: NextLoad<'_>) -> Result<LoadOutput> {
        let (url, _) = split_search(url);
        next.call(url, context)
    }
}

/// Load middleware serving registered content types.
#[derive(Debug, Clone)]
pub struct SyntheticLoader {
    registry: LoaderRegistry,
}

impl SyntheticLoader {
    #[must_use]
    pub fn new(registry: LoaderRegistry) -> Self {
        Self { registry }
    }
}

impl LoadHook for SyntheticLoader {
    fn load(&self, url: &str, context: &LoadContext, next: NextLoad<'_>) -> Result<LoadOutput> {
        let kind = context.import_attributes.content_type();
        if !self.registry.handles(kind) {
            return next.call(url, context);
        }

        let fetch = LoaderRegistry::needs_source(kind);
        let content = if fetch {
            let request = context.clone().with_format(kind);
            next.call(url, &request)?.source
        } else {
            None
        };

        let path = file_url_to_path(url).ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
        })?;
        let source = self
            .registry
            .transform(kind, content.as_ref().map(ModuleSource::as_bytes), &path)
            .ok_or_else(|| Error::InvalidLoader {
                kind: kind.to_string(),
            })?;

        trace!(url, kind, "synthesized module");
        Ok(LoadOutput {
            source: Some(ModuleSource::Text(source)),
            format: "module".to_string(),
            short_circuit: !fetch,
        })
    }
}

/// Validate `loaders` and register the synthetic loader.
pub fn register_loaders(host: &mut dyn ModuleHost, loaders: LoaderOptions) -> Result<()> {
    ensure_hooks(host)?;
    let registry = LoaderRegistry::from_options(loaders)?;
    debug!(loaders = ?registry, "registering loaders");

    host.register_hooks(Hooks {
        resolve: None,
        load: Some(Arc::new(SyntheticLoader::new(registry))),
    });
    Ok(())
}

/// Register the rewriting resolver, plus query stripping on load when enabled.
pub fn register_resolvers(
    host: &mut dyn ModuleHost,
    options: &ResolveOptions,
    rewriter: Rewriter,
) -> Result<()> {
    ensure_hooks(host)?;
    debug!(?options, rewriting = rewriter.is_active(), "registering resolver");

    host.register_hooks(Hooks {
        resolve: Some(Arc::new(RewriteResolver::new(options, rewriter))),
        load: options
            .handle_search
            .then(|| Arc::new(QueryStripLoader) as Arc<dyn LoadHook>),
    });
    Ok(())
}

/// Register everything `config` asks for.
///
/// Loaders are registered before resolvers, so the query-stripping loader
/// runs ahead of the synthetic one.
pub fn install(host: &mut dyn ModuleHost, config: &HookupConfig) -> Result<()> {
    ensure_hooks(host)?;
    let base = config.base_url()?;

    if let Some(loaders) = &config.register_loaders {
        register_loaders(host, loaders.clone())?;
    }

    let mut rewriter = Rewriter::new();
    if let Some(imports) = &config.imports {
        rewriter = rewriter.with_explicit(ImportMap::from_pairs(imports.iter(), base.as_ref()));
    }

    let options = config.resolve.clone().unwrap_or_default();
    if options.manifest_imports {
        if let Some(base) = base {
            rewriter = rewriter.with_manifest(base, Arc::new(ImportMapCache::default()));
        }
    }

    if config.resolve.is_some() || rewriter.is_active() {
        register_resolvers(host, &options, rewriter)?;
    }
    Ok(())
}
