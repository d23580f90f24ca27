use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use playground_engine::CustomInputs;

/// Level used when neither `RUST_LOG` nor the config file names one.
pub const DEFAULT_LOG: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Contents of a `--config` file. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub custom: CustomOverrides,
    pub log: Option<String>,
}

/// Partial custom inputs: a `None` field leaves the lower layer in place.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomOverrides {
    pub label: Option<String>,
    pub expression: Option<String>,
    pub expected: Option<String>,
}

impl CustomOverrides {
    /// Fields set here replace the matching fields of `base`.
    pub fn apply(&self, base: CustomInputs) -> CustomInputs {
        CustomInputs {
            label: self.label.clone().unwrap_or(base.label),
            expression: self.expression.clone().unwrap_or(base.expression),
            expected: self.expected.clone().unwrap_or(base.expected),
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn log_level(&self) -> &str {
        self.log.as_deref().unwrap_or(DEFAULT_LOG)
    }
}

/// Layer session defaults, then the config file, then flags.
/// `no_custom` drops the custom case whatever the layers say.
pub fn resolve_inputs(file: &FileConfig, flags: &CustomOverrides, no_custom: bool) -> CustomInputs {
    if no_custom {
        return CustomInputs::default();
    }
    flags.apply(file.custom.apply(CustomInputs::starter()))
}
