use std::path::{Path, PathBuf};

use anyhow::Context;
use ldpc_dataset::DatasetConfig;
use serde::{Deserialize, Serialize};

/// Settings read from the `--config` file.
///
/// ```toml
/// root = "/var/lib/ldpc"
///
/// [dataset]
/// write_guard = "serialized"
/// strict_links = false
///
/// [dataset.canon]
/// max_leaves = 65536
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Store directory used when `--root` is not given.
    pub root: PathBuf,
    pub dataset: DatasetConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".ldpc"),
            dataset: DatasetConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
