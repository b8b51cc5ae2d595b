use crate::loaders::LoaderOptions;
use crate::resolver::{InferOptions, STANDARD_EXTENSIONS};
use crate::{Error, Result};
use hookup_util::fs::is_dir;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;

/// Hook configuration, as read from a `hookup.json` style file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HookupConfig {
    /// Declaring module location. Relative import-map targets and the
    /// manifest lookup are anchored here.
    pub base: Option<PathBuf>,

    /// Resolver registration.
    pub resolve: Option<ResolveOptions>,

    /// Loader registration, by import-attribute `type`.
    pub register_loaders: Option<LoaderOptions>,

    /// Explicit import map.
    pub imports: Option<ImportsConfig>,
}

/// Resolver registration flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Infer `/index` for directory specifiers.
    pub directories: bool,

    /// Extension inference.
    pub extensions: ExtensionOption,

    /// Strip `?query` before resolution and re-append it afterwards.
    pub handle_search: bool,

    /// Rewrite through the enclosing manifest's `imports` field.
    pub manifest_imports: bool,
}

impl ResolveOptions {
    #[must_use]
    pub fn with_directories(mut self, on: bool) -> Self {
        self.directories = on;
        self
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionOption) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn with_handle_search(mut self, on: bool) -> Self {
        self.handle_search = on;
        self
    }

    #[must_use]
    pub fn with_manifest_imports(mut self, on: bool) -> Self {
        self.manifest_imports = on;
        self
    }

    /// Inference settings for the resolver.
    #[must_use]
    pub fn infer_options(&self) -> InferOptions {
        InferOptions {
            directories: self.directories,
            extensions: self.extensions.candidates(),
        }
    }
}

/// Extension inference setting: `false`, `true`, or an explicit list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawExtensions")]
pub enum ExtensionOption {
    #[default]
    Off,
    /// `.js`, `.mjs`, `.cjs`.
    Standard,
    List(Vec<String>),
}

impl ExtensionOption {
    /// Candidate list, `None` when inference is off.
    #[must_use]
    pub fn candidates(&self) -> Option<Vec<String>> {
        match self {
            Self::Off => None,
            Self::Standard => Some(STANDARD_EXTENSIONS.iter().map(ToString::to_string).collect()),
            Self::List(list) => Some(list.clone()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExtensions {
    Flag(bool),
    List(Vec<String>),
}

impl From<RawExtensions> for ExtensionOption {
    fn from(raw: RawExtensions) -> Self {
        match raw {
            RawExtensions::Flag(false) => Self::Off,
            RawExtensions::Flag(true) => Self::Standard,
            RawExtensions::List(list) => Self::List(list),
        }
    }
}

/// Explicit import map as ordered `(pattern, replacement)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportsConfig(pub Vec<(String, String)>);

impl ImportsConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'de> Deserialize<'de> for ImportsConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        map.into_iter()
            .map(|(pattern, target)| match target {
                Value::String(target) => Ok((pattern, target)),
                other => Err(D::Error::custom(format!(
                    "import map target for \"{pattern}\" must be a string, got {other}"
                ))),
            })
            .collect::<std::result::Result<_, _>>()
            .map(Self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ImportsConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl HookupConfig {
    /// Create an empty config anchored at `base`.
    #[must_use]
    pub fn new(base: PathBuf) -> Self {
        Self {
            base: Some(base),
            ..Default::default()
        }
    }

    /// Read a JSON config file.
    ///
    /// Without a `base` the file itself is the anchor; a relative `base` is
    /// taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.base = Some(match config.base.take() {
            Some(base) if base.is_relative() => dir.join(base),
            Some(base) => base,
            None => path.to_path_buf(),
        });

        Ok(config)
    }

    /// Set resolver registration.
    #[must_use]
    pub fn with_resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = Some(resolve);
        self
    }

    /// Set loader registration.
    #[must_use]
    pub fn with_loaders(mut self, loaders: LoaderOptions) -> Self {
        self.register_loaders = Some(loaders);
        self
    }

    /// Set the explicit import map.
    #[must_use]
    pub fn with_imports(mut self, imports: ImportsConfig) -> Self {
        self.imports = Some(imports);
        self
    }

    /// `file:` URL of `base`, made absolute against the working directory.
    /// An existing directory gets a trailing slash so relative targets land
    /// inside it.
    pub fn base_url(&self) -> Result<Option<Url>> {
        let Some(base) = &self.base else {
            return Ok(None);
        };
        let absolute = if base.is_absolute() {
            base.clone()
        } else {
            std::env::current_dir()?.join(base)
        };
        let url = if is_dir(&absolute) {
            Url::from_directory_path(&absolute)
        } else {
            Url::from_file_path(&absolute)
        };
        url.map(Some)
            .map_err(|()| Error::InvalidUrl {
                url: absolute.display().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::LoaderSpec;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config: HookupConfig = serde_json::from_str(
            r##"{
                "registerLoaders": {"text": true, "buffer": true},
                "resolve": {"directories": true, "extensions": true, "handleSearch": true},
                "imports": {"#/boot": "./boot2", "#/*": "./*"}
            }"##,
        )
        .unwrap();

        let resolve = config.resolve.unwrap();
        assert!(resolve.directories);
        assert!(resolve.handle_search);
        assert!(!resolve.manifest_imports);
        assert_eq!(resolve.extensions, ExtensionOption::Standard);

        let loaders = config.register_loaders.unwrap();
        assert!(matches!(loaders["text"], LoaderSpec::Builtin));

        let imports: Vec<_> = config.imports.unwrap().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(imports, ["#/boot", "#/*"]);
    }

    #[test]
    fn test_extension_option_shapes() {
        let parse = |json: &str| -> ExtensionOption {
            serde_json::from_str::<ResolveOptions>(&format!(r#"{{"extensions": {json}}}"#))
                .unwrap()
                .extensions
        };

        assert_eq!(parse("false"), ExtensionOption::Off);
        assert_eq!(parse("true"), ExtensionOption::Standard);
        assert_eq!(
            parse(r#"[".ts", ".js"]"#),
            ExtensionOption::List(vec![".ts".to_string(), ".js".to_string()])
        );
        assert_eq!(ResolveOptions::default().extensions, ExtensionOption::Off);
    }

    #[test]
    fn test_infer_options() {
        let off = ResolveOptions::default().infer_options();
        assert!(!off.is_enabled());

        let on = ResolveOptions::default()
            .with_directories(true)
            .with_extensions(ExtensionOption::Standard)
            .infer_options();
        assert!(on.directories);
        assert_eq!(
            on.extensions.as_deref(),
            Some(&[".js".to_string(), ".mjs".to_string(), ".cjs".to_string()][..])
        );
    }

    #[test]
    fn test_imports_keep_declaration_order() {
        let imports: ImportsConfig =
            serde_json::from_str(r##"{"#z": "./z.js", "#a": "./a.js", "#m/*": "./m/*"}"##)
                .unwrap();
        let keys: Vec<_> = imports.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["#z", "#a", "#m/*"]);
    }

    #[test]
    fn test_imports_reject_non_string_target() {
        let err = serde_json::from_str::<ImportsConfig>(r##"{"#a": ["./a.js"]}"##).unwrap_err();
        assert!(err.to_string().contains("#a"));
    }

    #[test]
    fn test_from_file_anchors_base() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hookup.json");
        fs::write(&path, r#"{"resolve": {"extensions": [".mjs"]}}"#).unwrap();

        let config = HookupConfig::from_file(&path).unwrap();
        assert_eq!(config.base.as_deref(), Some(path.as_path()));

        fs::write(&path, r#"{"base": "src/main.js"}"#).unwrap();
        let config = HookupConfig::from_file(&path).unwrap();
        assert_eq!(config.base, Some(dir.path().join("src/main.js")));
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            HookupConfig::from_file(&missing),
            Err(Error::ConfigRead { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, r##"{"imports": {"#a": 1}}"##).unwrap();
        assert!(matches!(
            HookupConfig::from_file(&broken),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_base_url() {
        let dir = tempdir().unwrap();
        let config = HookupConfig::new(dir.path().join("main.js"));
        let url = config.base_url().unwrap().unwrap();
        assert_eq!(url, Url::from_file_path(dir.path().join("main.js")).unwrap());

        let config = HookupConfig::new(dir.path().to_path_buf());
        let url = config.base_url().unwrap().unwrap();
        assert!(url.as_str().ends_with('/'));
        assert_eq!(url.join("./db.js").unwrap().to_file_path().unwrap(), dir.path().join("db.js"));

        assert!(HookupConfig::default().base_url().unwrap().is_none());
    }
}
