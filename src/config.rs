//! Configuration for huffpack

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HuffError, Result};

/// Encoding used for the tree inside the tree artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    /// Pre-order bit stream, one tag bit per node plus eight bits per leaf.
    #[default]
    Binary,
    /// Human-readable JSON of the node tree.
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub chunk_size: usize,
    pub flush_size: usize,
    pub tree_format: TreeFormat,
    pub compressed_extension: String,
    pub tree_extension: String,
    pub decoded_extension: String,
    pub gzip_level: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            flush_size: 64 * 1024,
            tree_format: TreeFormat::Binary,
            compressed_extension: "compressed".to_string(),
            tree_extension: "tree".to_string(),
            decoded_extension: "decoded".to_string(),
            gzip_level: 6,
        }
    }
}

impl CodecConfig {
    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: CodecConfig = serde_json::from_str(&text)
            .map_err(|e| HuffError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(HuffError::Config("chunk_size must be greater than zero".into()));
        }
        if self.flush_size == 0 {
            return Err(HuffError::Config("flush_size must be greater than zero".into()));
        }
        if self.gzip_level > 9 {
            return Err(HuffError::Config(format!(
                "gzip_level must be 0-9, got {}",
                self.gzip_level
            )));
        }
        for ext in [&self.compressed_extension, &self.tree_extension, &self.decoded_extension] {
            if ext.is_empty() {
                return Err(HuffError::Config("file extensions must not be empty".into()));
            }
        }
        Ok(())
    }
}
