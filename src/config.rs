//! Application configuration management.
//!
//! Configuration is layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config <PATH>`, or `config.toml` in the platform
//!    configuration directory when it exists
//! 3. Environment variables prefixed with `COMICLINK_`
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! The resulting value is validated once and then passed by reference to
//! every phase of the run.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{Classifier, VolumeMatcher, DEFAULT_VOLUME_PATTERN};
use crate::cli::Cli;
use crate::notify;
use crate::scanner::{WalkerConfig, DEFAULT_EXTENSIONS};

/// Prefix of environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "COMICLINK_";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The requested configuration file does not exist.
    #[error("configuration file not found: {0}")]
    MissingFile(PathBuf),

    /// No source directory was configured.
    #[error("no source directories configured")]
    NoSources,

    /// No file extension was configured.
    #[error("no file extensions configured")]
    NoExtensions,

    /// The volume pattern does not compile.
    #[error("invalid volume pattern '{pattern}': {source}")]
    VolumePattern {
        /// The rejected pattern
        pattern: String,
        /// The regex error
        #[source]
        source: regex::Error,
    },

    /// The volume pattern has nothing to extract the digits from.
    #[error("volume pattern '{0}' has no capture group")]
    VolumePatternGroup(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories scanned for comics.
    pub source_dirs: Vec<PathBuf>,
    /// Root of the published symlink tree.
    pub destination_root: PathBuf,
    /// Webhook receiving the run report.
    pub webhook_url: String,
    /// File extensions considered comics, without the dot.
    pub extensions: Vec<String>,
    /// Regex whose first capture group holds the volume digits.
    pub volume_pattern: String,
    /// Worker threads; 0 uses one per CPU.
    pub threads: usize,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Follow symbolic links inside sources.
    pub follow_symlinks: bool,
    /// Gitignore-style patterns excluded from the walk.
    pub exclude: Vec<String>,
    /// Link descriptor-bearing files without series or title by directory.
    pub missing_info_fallback: bool,
    /// Send the report to the webhook.
    pub notify: bool,
    /// Remove stale links after publishing.
    pub cleanup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dirs: vec![PathBuf::from("/path/to/your/comics/")],
            destination_root: PathBuf::from("/path/to/your/links/"),
            webhook_url: notify::PLACEHOLDER_WEBHOOK.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            volume_pattern: DEFAULT_VOLUME_PATTERN.to_string(),
            threads: 0,
            skip_hidden: false,
            follow_symlinks: false,
            exclude: Vec::new(),
            missing_info_fallback: false,
            notify: true,
            cleanup: true,
        }
    }
}

impl Config {
    /// Build the figment for defaults, file and environment.
    ///
    /// `config_file` replaces the platform default location when given.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_file {
            Some(path) => {
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.exists()) {
                    log::debug!("Using configuration file {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load defaults, file and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if an explicitly requested file
    /// does not exist, and [`ConfigError::Load`] if a source is malformed.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_file.filter(|p| !p.exists()) {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        Self::figment(config_file)
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "comiclink", "comiclink")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if !cli.sources.is_empty() {
            self.source_dirs.clone_from(&cli.sources);
        }
        if let Some(ref dest) = cli.dest {
            self.destination_root.clone_from(dest);
        }
        if let Some(ref url) = cli.webhook {
            self.webhook_url.clone_from(url);
        }
        if let Some(threads) = cli.threads {
            self.threads = threads;
        }
        if !cli.exclude_patterns.is_empty() {
            self.exclude.extend(cli.exclude_patterns.iter().cloned());
        }

        self.notify &= !cli.no_notify;
        self.cleanup &= !cli.no_cleanup;
        self.missing_info_fallback |= cli.missing_info_fallback;
        self.skip_hidden |= cli.skip_hidden;
        self.follow_symlinks |= cli.follow_symlinks;
        self
    }

    /// Check the configuration before any I/O happens.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_dirs.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::NoExtensions);
        }

        let regex = Regex::new(&self.volume_pattern).map_err(|source| {
            ConfigError::VolumePattern {
                pattern: self.volume_pattern.clone(),
                source,
            }
        })?;
        if regex.captures_len() < 2 {
            return Err(ConfigError::VolumePatternGroup(self.volume_pattern.clone()));
        }

        Ok(())
    }

    /// Whether the report should be posted after the run.
    #[must_use]
    pub fn should_notify(&self) -> bool {
        self.notify && notify::is_configured(&self.webhook_url)
    }

    /// Walker settings for the source roots.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_extensions(self.extensions.iter().filter(|e| !e.trim().is_empty()))
            .with_skip_hidden(self.skip_hidden)
            .with_follow_symlinks(self.follow_symlinks)
            .with_exclude_patterns(self.exclude.clone())
    }

    /// Classifier built from the volume pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::VolumePattern`] if the pattern does not
    /// compile; [`Config::validate`] catches this earlier.
    pub fn classifier(&self) -> Result<Classifier, ConfigError> {
        let volumes = VolumeMatcher::new(&self.volume_pattern).map_err(|source| {
            ConfigError::VolumePattern {
                pattern: self.volume_pattern.clone(),
                source,
            }
        })?;
        Ok(Classifier::new(volumes).with_missing_info_fallback(self.missing_info_fallback))
    }
}
