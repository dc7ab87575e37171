use serde::{Deserialize, Serialize};

use crate::error::{AttributeError, AttributeResult};

/// Construction-time settings for an [`AttributeStore`](crate::AttributeStore).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of attributes to reserve room for up front. The reservation
    /// goes through the normal growth policy, so the resulting capacity is
    /// rounded up to a power-of-two multiple of 4.
    pub initial_capacity: usize,
}

impl StoreConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> AttributeResult<Self> {
        toml::from_str(text).map_err(|e| AttributeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.initial_capacity, 0);
    }

    #[test]
    fn parse_from_toml() {
        let c = StoreConfig::from_toml_str("initial_capacity = 12").unwrap();
        assert_eq!(c.initial_capacity, 12);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let c = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(c, StoreConfig::default());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = StoreConfig::from_toml_str("initial_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, AttributeError::Config(_)));
    }
}
