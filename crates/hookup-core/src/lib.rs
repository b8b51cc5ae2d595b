#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod hooks;
pub mod loaders;
pub mod resolver;
pub mod specifier;
pub mod version;

pub use config::{ExtensionOption, HookupConfig, ImportsConfig, ResolveOptions};
pub use error::{Error, Result};
pub use hooks::{
    install, register_loaders, register_resolvers, HookChain, Hooks, ImportAttributes,
    LoadContext, LoadHook, LoadOutput, ModuleHost, ModuleSource, NextLoad, NextResolve,
    ResolveContext, ResolveHook, ResolveOutput,
};
pub use loaders::{LoaderFn, LoaderOptions, LoaderRegistry, LoaderSpec};
pub use resolver::{ImportMap, ImportMapCache, ResolutionKind, Rewriter};
pub use specifier::Specifier;
pub use version::{BuildInfo, VERSION};
