//! `jolt.toml` configuration and tracing setup.

mod diagnostics;
mod schema;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

pub use diagnostics::ConfigWarning;
pub use schema::json_schema;

/// File names probed by [`discover_config_path`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["jolt.toml", ".jolt/config.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message only; the default `Display` embeds a source snippet.
        ConfigError::Toml(err.message().to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct JoltConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub refactor: RefactorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to this file as well. If it cannot be opened, file logging is skipped.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn level_is_valid(&self) -> bool {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).is_ok()
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, merged with `RUST_LOG` when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        match env_directives {
            Some(env_directives) => {
                let combined = format!(
                    "{},{env_directives}",
                    Self::normalize_level_directives(&self.level)
                );
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct RefactorConfig {
    #[serde(default)]
    pub change_signature: ChangeSignatureConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ChangeSignatureConfig {
    /// Reparse the edited declaring file and report newly introduced compile errors.
    #[serde(default = "default_true")]
    pub compile_check: bool,

    /// Rewrite `{@link Type#method(..)}` style references in doc comments.
    #[serde(default = "default_true")]
    pub update_doc_references: bool,

    /// Import resolved parameter and return types. When disabled, types are written qualified.
    #[serde(default = "default_true")]
    pub add_imports: bool,

    /// Add explicit `super(..)` calls to subclasses when a no-arg constructor changes.
    #[serde(default = "default_true")]
    pub ripple_constructors: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ChangeSignatureConfig {
    fn default() -> Self {
        Self {
            compile_check: true,
            update_doc_references: true,
            add_imports: true,
            ripple_constructors: true,
        }
    }
}

impl JoltConfig {
    /// Parse a config from TOML, collecting unknown keys and recoverable problems as warnings.
    pub fn load_from_str(text: &str) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<JoltConfig>(text)?;
        let mut warnings: Vec<ConfigWarning> = unknown_keys
            .into_iter()
            .map(|path| ConfigWarning::UnknownKey { path })
            .collect();
        if !config.logging.level_is_valid() {
            warnings.push(ConfigWarning::LoggingLevelInvalid {
                value: config.logging.level.clone(),
            });
        }
        Ok((config, warnings))
    }

    pub fn load_from_path(
        path: impl AsRef<Path>,
    ) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let (mut config, warnings) = Self::load_from_str(&text)?;
        // A relative log file is relative to the config file.
        if let (Some(file), Some(dir)) = (config.logging.file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        Ok((config, warnings))
    }
}

/// Find the config file for a project root: `jolt.toml`, then `.jolt/config.toml`.
pub fn discover_config_path(root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load the configuration for a project root, or the defaults when there is none.
pub fn load_for_workspace(
    root: &Path,
) -> Result<(JoltConfig, Option<PathBuf>, Vec<ConfigWarning>), ConfigError> {
    let Some(path) = discover_config_path(root) else {
        return Ok((JoltConfig::default(), None, Vec::new()));
    };
    let (config, warnings) = JoltConfig::load_from_path(&path)?;
    Ok((config, Some(path), warnings))
}

static TRACING_INIT: OnceLock<bool> = OnceLock::new();

/// Install the global `tracing` subscriber described by `config`.
///
/// Only the first call has an effect. Returns whether a jolt subscriber is
/// installed; `false` means another global subscriber was already set.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    *TRACING_INIT.get_or_init(|| install_subscriber(config))
}

fn install_subscriber(config: &LoggingConfig) -> bool {
    let filter = config.env_filter();

    let file = config.file.as_ref().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    let file_failed = config.file.is_some() && file.is_none();

    let writer = match (config.stderr, file) {
        (true, Some(file)) => BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file))),
        (false, Some(file)) => BoxMakeWriter::new(Mutex::new(file)),
        (true, None) => BoxMakeWriter::new(std::io::stderr),
        (false, None) => BoxMakeWriter::new(std::io::sink),
    };

    let layer: Box<dyn Layer<_> + Send + Sync> = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    let installed = tracing::subscriber::set_global_default(subscriber).is_ok();
    if installed && file_failed {
        if let Some(path) = config.file.as_ref() {
            tracing::warn!(
                target: "jolt.cli",
                path = %path.display(),
                "failed to open log file; file logging disabled"
            );
        }
    }
    installed
}
