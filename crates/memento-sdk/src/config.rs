use std::path::Path;

use memento_types::{KeyCodec, DEFAULT_DATA_PREFIX};
use serde::{Deserialize, Serialize};

use crate::error::{MementoError, MementoResult};

/// Settings for a [`crate::MementoStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MementoConfig {
    /// Prepended to every storage key.
    pub path_prefix: String,
    /// Identifier namespace stripped before keying.
    pub data_prefix: String,
    /// Page size requested from paged backends.
    pub index_page_size: usize,
}

impl Default for MementoConfig {
    fn default() -> Self {
        Self {
            path_prefix: String::new(),
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
            index_page_size: 1000,
        }
    }
}

impl MementoConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> MementoResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| MementoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> MementoResult<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MementoError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> MementoResult<()> {
        if self.index_page_size == 0 {
            return Err(MementoError::Config("index_page_size must be at least 1".into()));
        }
        Ok(())
    }

    /// The key codec described by this configuration.
    pub fn key_codec(&self) -> KeyCodec {
        KeyCodec::new(self.path_prefix.clone(), self.data_prefix.clone())
    }
}
