//! Field configuration
//!
//! ```toml
//! debounce_time_ms = 100
//!
//! [[options]]
//! label = "label 1"
//! value = "value 1"
//! ```
//!
//! `options` may be replaced at runtime; an empty list is ignored.
//! `debounce_time_ms` only controls how quickly the visible menu follows the
//! text box. Tests set it to `0` to make menu filtering synchronous.

use std::fs;
use std::path::Path;
use std::time::Duration;

use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::option::{FieldOption, OptionValue};

/// Default menu debounce in milliseconds
pub const DEFAULT_DEBOUNCE_TIME_MS: u64 = 100;

fn default_debounce_time_ms() -> u64 {
    DEFAULT_DEBOUNCE_TIME_MS
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct FieldConfig<V> {
    #[serde(default)]
    pub options: Vec<FieldOption<V>>,
    #[serde(default = "default_debounce_time_ms")]
    pub debounce_time_ms: u64,
}

impl<V> Default for FieldConfig<V> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            debounce_time_ms: DEFAULT_DEBOUNCE_TIME_MS,
        }
    }
}

impl<V> FieldConfig<V> {
    pub fn new(options: Vec<FieldOption<V>>) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn debounce_time_ms(mut self, ms: u64) -> Self {
        self.debounce_time_ms = ms;
        self
    }

    pub fn debounce_time(&self) -> Duration {
        Duration::from_millis(self.debounce_time_ms)
    }

    /// Require at least one option
    ///
    /// Parsing accepts an empty list because options may arrive at runtime;
    /// callers that need a usable menu up front check here.
    pub fn validate(&self) -> Result<()> {
        if self.options.is_empty() {
            return Err(ConfigError::EmptyOptions);
        }
        Ok(())
    }
}

impl<V: OptionValue> FieldConfig<V> {
    /// Labels that appear on more than one option
    ///
    /// Lookups still work (the later option wins), but typed text can only
    /// ever reach one of the duplicates.
    pub fn duplicate_labels(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        let mut duplicates = Vec::new();
        for option in &self.options {
            let label = option.label.as_str();
            if !seen.insert(label) && !duplicates.contains(&label) {
                duplicates.push(label);
            }
        }
        duplicates
    }
}

impl<V: OptionValue + DeserializeOwned> FieldConfig<V> {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        for label in config.duplicate_labels() {
            tracing::warn!(%label, "duplicate option label, the last option wins");
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
