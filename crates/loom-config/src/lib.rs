//! Configuration for instrumentation builds.
//!
//! Loom reads an optional `loom.toml`:
//!
//! ```toml
//! [bridges]
//! resolve = true
//! conflict_policy = "fail-fast"   # or "fail-on-request", "call-bridge"
//!
//! [auxiliary]
//! suffix = "auxiliary"
//!
//! [logging]
//! level = "info"
//! json = false
//! stderr = true
//! ```
//!
//! Every section and key is optional; unknown keys are rejected.

use std::path::Path;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use loom_instrument::{BridgeResolverStrategy, ConflictPolicy, Context, DEFAULT_AUXILIARY_SUFFIX};
use loom_model::TypeDescription;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoomConfig {
    pub bridges: BridgesConfig,
    pub auxiliary: AuxiliaryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgesConfig {
    /// Resolve bridge methods before planning super calls. When disabled, super calls may land
    /// on bridges.
    #[serde(default = "BridgesConfig::default_resolve")]
    pub resolve: bool,

    /// What to do when a bridge has more than one possible target.
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

impl BridgesConfig {
    fn default_resolve() -> bool {
        true
    }
}

impl Default for BridgesConfig {
    fn default() -> Self {
        Self {
            resolve: Self::default_resolve(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuxiliaryConfig {
    /// Infix of generated auxiliary type names, as in `Foo$auxiliary$1`.
    #[serde(default = "AuxiliaryConfig::default_suffix")]
    pub suffix: String,
}

impl AuxiliaryConfig {
    fn default_suffix() -> String {
        DEFAULT_AUXILIARY_SUFFIX.to_owned()
    }
}

impl Default for AuxiliaryConfig {
    fn default() -> Self {
        Self {
            suffix: Self::default_suffix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all Loom crates.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled, logs are discarded.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
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
            // Anything else is treated as an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective `EnvFilter`.
    ///
    /// `level` may be a simple level (`info`, `debug`, ...) or a full directive string such as
    /// `warn,loom.bridge=trace`. If `RUST_LOG` is set, it is merged into the result.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
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
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` includes a snippet of the input; the message alone is enough.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl LoomConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::load_from_str(&text)?;
        tracing::debug!(
            target: "loom.config",
            path = %path.display(),
            "loaded config"
        );
        Ok(config)
    }

    /// Load a config from a TOML string.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: LoomConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let suffix = &self.auxiliary.suffix;
        if suffix.is_empty() {
            return Err(ConfigError::Invalid {
                key: "auxiliary.suffix",
                message: "must not be empty".to_owned(),
            });
        }
        if let Some(c) = suffix.chars().find(|c| matches!(c, '/' | '.' | ';' | '[' | '$')) {
            return Err(ConfigError::Invalid {
                key: "auxiliary.suffix",
                message: format!("must not contain `{c}`"),
            });
        }
        Ok(())
    }

    /// The bridge resolver strategy handed to target factories.
    pub fn bridge_resolver_strategy(&self) -> BridgeResolverStrategy {
        if self.bridges.resolve {
            BridgeResolverStrategy::Simple(self.bridges.conflict_policy)
        } else {
            BridgeResolverStrategy::NoOp
        }
    }

    /// A fresh auxiliary type registry for one build of `instrumented_type`.
    pub fn context_for(&self, instrumented_type: &TypeDescription) -> Context {
        Context::with_suffix(instrumented_type.clone(), self.auxiliary.suffix.clone())
    }
}

static TRACING_INIT: Once = Once::new();

/// Initializes structured `tracing` logging.
///
/// This function is safe to call multiple times; only the first call installs a global
/// subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let make_writer = if !config.stderr {
            BoxMakeWriter::new(std::io::sink)
        } else if cfg!(debug_assertions) {
            // Keeps `cargo test` output captured.
            BoxMakeWriter::new(tracing_subscriber::fmt::writer::TestWriter::with_stderr)
        } else {
            BoxMakeWriter::new(std::io::stderr)
        };

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!(
                target: "loom.config",
                level = %config.level,
                json = config.json,
                "initialized tracing"
            );
        }
    });
}
