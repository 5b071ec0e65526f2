use ldpc_codec::CanonConfig;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

/// How read-merge-write operations protect against concurrent writers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteGuard {
    /// No protection: concurrent read-merge-writes on one URI can lose
    /// updates (the later write wins).
    #[default]
    Unguarded,
    /// Read-merge-writes on the same URI run one at a time within this
    /// process.
    Serialized,
    /// The write only lands if the stored hash is unchanged since the read;
    /// otherwise the call fails with `DatasetError::Conflict`.
    Optimistic,
}

/// Configuration for a [`Dataset`](crate::Dataset).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub write_guard: WriteGuard,
    /// Fail link lookups that match more than one container instead of
    /// returning the first.
    pub strict_links: bool,
    /// Canonical labeling limits.
    pub canon: CanonConfig,
}

impl DatasetConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> DatasetResult<Self> {
        toml::from_str(s).map_err(|e| DatasetError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> DatasetResult<String> {
        toml::to_string(self).map_err(|e| DatasetError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DatasetConfig::default();
        assert_eq!(c.write_guard, WriteGuard::Unguarded);
        assert!(!c.strict_links);
        assert_eq!(c.canon.max_leaves, 65_536);
    }

    #[test]
    fn parse_toml() {
        let c = DatasetConfig::from_toml_str(
            r#"
write_guard = "optimistic"
strict_links = true

[canon]
max_leaves = 100
"#,
        )
        .unwrap();
        assert_eq!(c.write_guard, WriteGuard::Optimistic);
        assert!(c.strict_links);
        assert_eq!(c.canon.max_leaves, 100);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(DatasetConfig::from_toml_str("").unwrap(), DatasetConfig::default());
    }

    #[test]
    fn unknown_guard_is_rejected() {
        let err = DatasetConfig::from_toml_str(r#"write_guard = "locked""#).unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let c = DatasetConfig {
            write_guard: WriteGuard::Serialized,
            strict_links: true,
            canon: CanonConfig { max_leaves: 7 },
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(DatasetConfig::from_toml_str(&text).unwrap(), c);
    }
}
