use serde::Deserialize;

use crate::error::ConfigError;

/// Settings for a [`Heap`](crate::heap::Heap).
///
/// ```
/// use hvterm::config::HeapConfig;
///
/// let config = HeapConfig::from_toml_str("capacity = 4096").unwrap();
/// assert_eq!(config.capacity, 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeapConfig {
    /// Number of cells the heap may ever hand out.
    pub capacity: u64,
}

impl HeapConfig {
    /// Default number of cells (16 Mi cells, 128 MiB).
    pub const DEFAULT_CAPACITY: u64 = 1 << 24;

    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = HeapConfig::from_toml_str("").unwrap();
        assert_eq!(config, HeapConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = HeapConfig::from_toml_str("capacty = 12").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
