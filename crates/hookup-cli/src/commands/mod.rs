pub mod load;
pub mod resolve;
pub mod version;

use hookup_core::loaders::{BUFFER, TEXT};
use hookup_core::{install, ExtensionOption, HookChain, HookupConfig, LoaderSpec, ResolveOptions};
use miette::{miette, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Command-line hook settings, layered over an optional config file.
#[derive(Debug, Clone, Default)]
pub struct HookOptions {
    pub parent: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub directories: bool,
    pub extensions: bool,
    pub ext: Vec<String>,
    pub handle_search: bool,
    pub manifest_imports: bool,
    pub imports: Vec<String>,
}

/// A host with hooks installed, plus the importing module's URL.
pub struct Session {
    pub host: HookChain,
    pub parent_url: String,
}

impl HookOptions {
    /// Build the effective config. Flags only ever switch features on.
    fn into_config(self, cwd: &Path) -> Result<HookupConfig> {
        let mut config = match &self.config {
            Some(path) => HookupConfig::from_file(&absolute(cwd, path)).into_diagnostic()?,
            None => HookupConfig::new(self.parent.as_ref().map_or_else(
                || cwd.to_path_buf(),
                |parent| absolute(cwd, parent),
            )),
        };

        let declared = config.resolve.is_some();
        let mut resolve = config.resolve.take().unwrap_or_default();
        resolve.directories |= self.directories;
        resolve.handle_search |= self.handle_search;
        resolve.manifest_imports |= self.manifest_imports;
        if !self.ext.is_empty() {
            resolve.extensions = ExtensionOption::List(self.ext);
        } else if self.extensions && resolve.extensions == ExtensionOption::Off {
            resolve.extensions = ExtensionOption::Standard;
        }
        if declared || resolve != ResolveOptions::default() {
            config.resolve = Some(resolve);
        }

        if !self.imports.is_empty() {
            let mut imports = config.imports.take().unwrap_or_default();
            for entry in &self.imports {
                let (pattern, target) = entry
                    .split_once('=')
                    .ok_or_else(|| miette!("import map entry must be PATTERN=TARGET, got '{entry}'"))?;
                imports.0.push((pattern.to_string(), target.to_string()));
            }
            config.imports = Some(imports);
        }

        Ok(config)
    }

    /// Install hooks into a fresh in-process host.
    pub fn into_session(self, cwd: &Path, loaders: bool) -> Result<Session> {
        let parent = self.parent.as_ref().map(|p| absolute(cwd, p));
        let mut config = self.into_config(cwd)?;

        if loaders && config.register_loaders.is_none() {
            config.register_loaders = Some(
                [TEXT, BUFFER]
                    .into_iter()
                    .map(|kind| (kind.to_string(), LoaderSpec::Builtin))
                    .collect(),
            );
        }

        let mut host = HookChain::new();
        install(&mut host, &config).into_diagnostic()?;

        let parent_url = match parent {
            Some(parent) => Url::from_file_path(&parent)
                .map_err(|()| miette!("invalid parent path: {}", parent.display()))?,
            None => Url::from_directory_path(cwd)
                .map_err(|()| miette!("invalid working directory: {}", cwd.display()))?,
        };

        Ok(Session {
            host,
            parent_url: parent_url.to_string(),
        })
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
