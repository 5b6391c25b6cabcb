//! Database location configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".rollcall/rollcall.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `:memory:` for ephemeral use.
    #[serde(default = "default_path")]
    pub path: String,
}

impl DatabaseConfig {
    /// Whether the configured database is in-memory (nothing persists).
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, ".rollcall/rollcall.db");
        assert!(!config.is_memory());
    }
}
