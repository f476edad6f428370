//! Per-endpoint query configuration.

use std::collections::BTreeMap;

use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::kind::ParameterKind;
use crate::page::DEFAULT_PAGE_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to extract query config: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("default_page_size must be positive")]
    ZeroPageSize,

    #[error("default_page_size {default} exceeds max_page_size {max}")]
    DefaultExceedsMax { default: u64, max: u64 },
}

/// Tuning of one [`QueryBuilder`](crate::QueryBuilder).
///
/// ```yaml
/// query:
///   default_page_size: 20
///   max_page_size: 200
///   disabled_parameters: [email]
///   extra_parameters:
///     nickname: string
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Page size when `limit` is absent.
    pub default_page_size: u64,
    /// Upper bound of `limit`; unbounded when unset.
    pub max_page_size: Option<u64>,
    pub disabled_parameters: Vec<String>,
    pub extra_parameters: BTreeMap<String, ParameterKind>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
            disabled_parameters: Vec::new(),
            extra_parameters: BTreeMap::new(),
        }
    }
}

impl QueryConfig {
    /// Extract the config found under `key` and validate it.
    ///
    /// A missing key yields the defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` if the tree does not deserialize or the result is invalid.
    pub fn from_figment(figment: &Figment, key: &str) -> Result<Self, ConfigError> {
        let config: Self = if figment.contains(key) {
            figment.extract_inner(key).map_err(Box::new)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// - `ConfigError::ZeroPageSize` if `default_page_size` is 0
    /// - `ConfigError::DefaultExceedsMax` if `default_page_size` is above `max_page_size`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if let Some(max) = self.max_page_size
            && self.default_page_size > max
        {
            return Err(ConfigError::DefaultExceedsMax {
                default: self.default_page_size,
                max,
            });
        }
        Ok(())
    }
}
