//! Layered configuration for `mergecat`.
//!
//! Precedence, lowest first: built-in defaults, the TOML configuration file,
//! `MERGECAT_*` environment variables, then command-line flags.
//!
//! ```toml
//! root = "conf"
//!
//! [aliases]
//! base = { url = "file:///etc/app/base.yaml" }
//! local = { url = "local.cfg", type = "application/toml" }
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mergefs::{Alias, AliasRegistry, DirBackend, MergeFs, SchemeMux};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::CliError;

/// Configuration file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "mergecat.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "MERGECAT_";

/// Scheme served by [`MergecatConfig::file_root`].
pub const FILE_SCHEME: &str = "file";

/// One configured alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasConfig {
    /// Address the alias expands to.
    pub url: String,
    /// Content type override.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Settings for a `mergecat` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergecatConfig {
    /// Directory serving relative source paths.
    pub root: Utf8PathBuf,
    /// Directory serving `file:` addresses.
    pub file_root: Utf8PathBuf,
    /// Aliases by name.
    pub aliases: BTreeMap<String, AliasConfig>,
}

impl Default for MergecatConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            file_root: Utf8PathBuf::from("/"),
            aliases: BTreeMap::new(),
        }
    }
}

/// The subset of [`MergecatConfig`] that command-line flags can set.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<Utf8PathBuf>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    aliases: BTreeMap<String, AliasConfig>,
}

impl CliOverrides {
    fn from_args(args: &Args) -> Self {
        Self {
            root: args.root.clone(),
            aliases: args
                .aliases
                .iter()
                .map(|(name, url)| {
                    (
                        name.clone(),
                        AliasConfig {
                            url: url.clone(),
                            content_type: None,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl MergecatConfig {
    /// Gather configuration for `args` from every layer.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingConfig`] when `--config` names a file that
    /// does not exist, and [`CliError::Config`] when a layer fails to parse.
    pub fn load(args: &Args) -> Result<Self, CliError> {
        let config_path = match &args.config {
            Some(path) if !path.is_file() => return Err(CliError::MissingConfig(path.clone())),
            Some(path) => path.clone(),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        tracing::debug!(path = %config_path, "loading configuration");

        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_path.as_std_path()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["log", "config"]))
            .merge(Serialized::defaults(CliOverrides::from_args(args)))
            .extract::<Self>()?;
        Ok(config)
    }

    /// Build the alias registry described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Merge`] when an alias URL is not a valid address.
    pub fn alias_registry(&self) -> Result<AliasRegistry, CliError> {
        let mut registry = AliasRegistry::new();
        for (name, entry) in &self.aliases {
            let mut alias = Alias::parse(&entry.url)?;
            if let Some(content_type) = &entry.content_type {
                alias = alias.with_content_type(content_type);
            }
            registry.register(name, alias);
        }
        Ok(registry)
    }

    /// Build the scheme multiplexer: [`Self::root`] serves relative paths and
    /// [`Self::file_root`] serves `file:` addresses.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Root`] when either directory cannot be opened.
    pub fn scheme_mux(&self) -> Result<SchemeMux, CliError> {
        let mut mux = SchemeMux::new();
        mux.register("", open_dir("", &self.root)?);
        mux.register(FILE_SCHEME, open_dir(FILE_SCHEME, &self.file_root)?);
        Ok(mux)
    }

    /// Build the merge filesystem for this configuration.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Self::alias_registry`] and
    /// [`Self::scheme_mux`].
    pub fn merge_fs(&self) -> Result<MergeFs, CliError> {
        Ok(MergeFs::new(self.scheme_mux()?, self.alias_registry()?))
    }
}

fn open_dir(scheme: &'static str, path: &Utf8Path) -> Result<DirBackend, CliError> {
    DirBackend::open_ambient(path).map_err(|source| CliError::Root {
        scheme,
        path: path.to_path_buf(),
        source,
    })
}
