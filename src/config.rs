//! Codec configuration, persisted as TOML.
//!
//! ```toml
//! [reader]
//! max_depth = 512
//! nil_as_empty_list = false
//!
//! [writer]
//! constant_prefix = false
//!
//! [cache]
//! capacity = 1024
//! max_age = 100000
//!
//! [oracle]
//! functions = ["GovernmentFn", "CapitalFn"]
//!
//! [constants]
//! Brazil = "bd588f01-9c29-11b1-9dad-c379636f7270"
//! ```
//!
//! Every table and key is optional.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::BoundedCache;
use crate::error::{ConfigError, WireResult};
use crate::registry::ConstantRegistry;
use crate::term::Guid;
use crate::wire::{DEFAULT_MAX_DEPTH, NamedFunctions, ReaderOptions, WriteOptions};

/// Reader limits and dialect switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub nil_as_empty_list: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            nil_as_empty_list: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    #[serde(default)]
    pub constant_prefix: bool,
}

/// Limits for result caches built from this configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Insertions an entry survives; unset means no age limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

fn default_capacity() -> usize {
    1024
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_age: None,
        }
    }
}

/// Functors known to build reified terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub functions: Vec<String>,
}

/// Top-level codec configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Constants to intern before reading, by name.
    #[serde(default)]
    pub constants: BTreeMap<String, Guid>,
}

impl CodecConfig {
    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> WireResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded codec config");
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> WireResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// Pretty TOML text of this configuration.
    pub fn to_toml(&self) -> WireResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::Invalid {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Reject limits that would make the codec unusable.
    pub fn validate(&self) -> WireResult<()> {
        let invalid = |message: &str| -> WireResult<()> {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            }
            .into())
        };
        if self.reader.max_depth == 0 {
            return invalid("reader.max_depth must be at least 1");
        }
        if self.cache.capacity == 0 {
            return invalid("cache.capacity must be at least 1");
        }
        if self.cache.max_age == Some(0) {
            return invalid("cache.max_age must be at least 1 when set");
        }
        Ok(())
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            max_depth: self.reader.max_depth,
            nil_as_empty_list: self.reader.nil_as_empty_list,
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            constant_prefix: self.writer.constant_prefix,
        }
    }

    /// Oracle answering for the configured function names.
    pub fn oracle(&self) -> NamedFunctions {
        self.oracle.functions.iter().cloned().collect()
    }

    /// An empty result cache with the configured limits.
    pub fn build_cache<K, V>(&self) -> WireResult<BoundedCache<K, V>>
    where
        K: std::hash::Hash + Eq + Clone,
        V: Clone,
    {
        BoundedCache::new(self.cache.capacity, self.cache.max_age)
    }

    /// Intern every configured constant into `registry`.
    pub fn preload(&self, registry: &ConstantRegistry) -> WireResult<usize> {
        for (name, guid) in &self.constants {
            registry.intern(name, *guid)?;
        }
        Ok(self.constants.len())
    }
}
