//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default audit query page size.
const fn default_page_size() -> u32 {
    20
}

/// Hard cap on caller-supplied page sizes.
const fn max_page_size() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Page size used when a query does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound enforced on caller-supplied page sizes.
    #[serde(default = "max_page_size")]
    pub max_page_size: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: max_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
    }
}
