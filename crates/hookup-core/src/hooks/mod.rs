//! Resolve/load middleware model of the host module system.
//!
//! Every hook receives a continuation (`NextResolve` / `NextLoad`) that runs
//! the rest of the chain. The continuation is consumed on call, so a hook can
//! delegate at most once.

mod chain;
mod install;

pub use chain::HookChain;
pub use install::{
    install, register_loaders, register_resolvers, QueryStripLoader, RewriteResolver,
    SyntheticLoader,
};

use crate::resolver::{ResolutionKind, REQUIRE_CONDITION};
use crate::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Content type used when an import carries no `type` attribute.
pub const DEFAULT_CONTENT_TYPE: &str = "javascript";

/// Import attributes attached to an import statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportAttributes {
    /// The `type` attribute (`with { type: "text" }`).
    pub kind: Option<String>,
}

impl ImportAttributes {
    /// Attributes with the given `type`.
    #[must_use]
    pub fn with_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
        }
    }

    /// Declared content type, `javascript` when absent.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Context passed to resolve hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveContext {
    /// URL of the importing module; `None` for the entry point.
    pub parent_url: Option<String>,
    /// Active resolution conditions.
    pub conditions: BTreeSet<String>,
    /// Attributes from the import statement.
    pub import_attributes: ImportAttributes,
}

impl ResolveContext {
    /// Context for an ESM import from `parent_url`.
    #[must_use]
    pub fn new(parent_url: impl Into<String>) -> Self {
        Self {
            parent_url: Some(parent_url.into()),
            conditions: ["node", "import"].into_iter().map(String::from).collect(),
            import_attributes: ImportAttributes::default(),
        }
    }

    /// Context for a `require()` call from `parent_url`.
    #[must_use]
    pub fn require(parent_url: impl Into<String>) -> Self {
        Self {
            parent_url: Some(parent_url.into()),
            conditions: ["node", REQUIRE_CONDITION]
                .into_iter()
                .map(String::from)
                .collect(),
            import_attributes: ImportAttributes::default(),
        }
    }

    /// Set import attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ImportAttributes) -> Self {
        self.import_attributes = attributes;
        self
    }

    /// Whether the require-style condition is active.
    #[must_use]
    pub fn is_require(&self) -> bool {
        self.kind() == ResolutionKind::Require
    }

    #[must_use]
    pub fn kind(&self) -> ResolutionKind {
        ResolutionKind::from_conditions(&self.conditions)
    }
}

/// Result of a resolve chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutput {
    /// Resolved module URL.
    pub url: String,
    /// Format hint for the loader (`module`, `commonjs`, `json`, `builtin`).
    pub format: Option<String>,
}

impl ResolveOutput {
    /// Output for `url` with no format hint.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: None,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Context passed to load hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadContext {
    /// Requested format, if any.
    pub format: Option<String>,
    /// Active resolution conditions.
    pub conditions: BTreeSet<String>,
    /// Attributes from the import statement.
    pub import_attributes: ImportAttributes,
}

impl LoadContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: ImportAttributes) -> Self {
        self.import_attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Module source text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    Text(String),
    Bytes(Vec<u8>),
}

impl ModuleSource {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Text view, replacing invalid UTF-8.
    #[must_use]
    pub fn to_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Text(text) => std::borrow::Cow::Borrowed(text),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

/// Result of a load chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutput {
    /// Module source; `None` for builtins.
    pub source: Option<ModuleSource>,
    /// Module format (`module`, `commonjs`, `json`, `builtin`).
    pub format: String,
    /// Whether the hook ended the chain without delegating.
    pub short_circuit: bool,
}

type ResolveFn<'a> = Box<dyn FnOnce(&str, &ResolveContext) -> Result<ResolveOutput> + 'a>;
type LoadFn<'a> = Box<dyn FnOnce(&str, &LoadContext) -> Result<LoadOutput> + 'a>;

/// Continuation to the next resolver in the chain.
pub struct NextResolve<'a> {
    inner: ResolveFn<'a>,
}

impl<'a> NextResolve<'a> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&str, &ResolveContext) -> Result<ResolveOutput> + 'a,
    {
        Self { inner: Box::new(f) }
    }

    /// Run the rest of the chain.
    pub fn call(self, specifier: &str, context: &ResolveContext) -> Result<ResolveOutput> {
        (self.inner)(specifier, context)
    }
}

/// Continuation to the next loader in the chain.
pub struct NextLoad<'a> {
    inner: LoadFn<'a>,
}

impl<'a> NextLoad<'a> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&str, &LoadContext) -> Result<LoadOutput> + 'a,
    {
        Self { inner: Box::new(f) }
    }

    /// Run the rest of the chain.
    pub fn call(self, url: &str, context: &LoadContext) -> Result<LoadOutput> {
        (self.inner)(url, context)
    }
}

/// A resolve middleware.
pub trait ResolveHook: Send + Sync {
    fn resolve(
        &self,
        specifier: &str,
        context: &ResolveContext,
        next: NextResolve<'_>,
    ) -> Result<ResolveOutput>;
}

/// A load middleware.
pub trait LoadHook: Send + Sync {
    fn load(&self, url: &str, context: &LoadContext, next: NextLoad<'_>) -> Result<LoadOutput>;
}

/// One registration's worth of hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    pub resolve: Option<Arc<dyn ResolveHook>>,
    pub load: Option<Arc<dyn LoadHook>>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("resolve", &self.resolve.is_some())
            .field("load", &self.load.is_some())
            .finish()
    }
}

/// A host module system that hooks can be installed into.
pub trait ModuleHost {
    /// Host version, for error reporting.
    fn version(&self) -> &str;

    /// Whether the host exposes hook registration at all.
    fn supports_hooks(&self) -> bool;

    /// Install hooks. Later registrations run before earlier ones.
    fn register_hooks(&mut self, hooks: Hooks);
}
