//! Persisted artifacts
//!
//! A compression job yields the packed payload plus a [`TreeArtifact`]: the
//! serialized tree together with the exact symbol count and payload bit
//! length. The artifact is stored with bincode, either as a companion file or
//! as the header of a single-file container.

use serde::{Deserialize, Serialize};

use crate::code_table::MAX_CODE_LEN;
use crate::config::TreeFormat;
use crate::error::{HuffError, Result};
use crate::tree::HuffmanTree;
use crate::tree_codec;

const ARTIFACT_MAGIC: [u8; 4] = *b"HUFT";
const ARTIFACT_VERSION: u8 = 1;
const CONTAINER_MAGIC: [u8; 4] = *b"HUFF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeArtifact {
    magic: [u8; 4],
    version: u8,
    pub format: TreeFormat,
    pub symbol_count: u64,
    pub bit_length: u64,
    /// Serialized tree; absent only when the input was empty.
    pub tree: Option<Vec<u8>>,
}

impl TreeArtifact {
    pub fn new(
        tree: &HuffmanTree,
        format: TreeFormat,
        symbol_count: u64,
        bit_length: u64,
    ) -> Result<Self> {
        Ok(Self {
            magic: ARTIFACT_MAGIC,
            version: ARTIFACT_VERSION,
            format,
            symbol_count,
            bit_length,
            tree: Some(tree_codec::serialize(tree, format)?),
        })
    }

    /// Artifact for a zero-length input.
    pub fn empty(format: TreeFormat) -> Self {
        Self {
            magic: ARTIFACT_MAGIC,
            version: ARTIFACT_VERSION,
            format,
            symbol_count: 0,
            bit_length: 0,
            tree: None,
        }
    }

    /// Rebuild the tree, or `None` for an empty input.
    pub fn tree(&self) -> Result<Option<HuffmanTree>> {
        self.tree
            .as_deref()
            .map(|bytes| tree_codec::deserialize(bytes, self.format))
            .transpose()
    }

    /// Bytes of packed payload implied by `bit_length`.
    pub fn payload_len(&self) -> u64 {
        self.bit_length / 8 + u64::from(self.bit_length % 8 != 0)
    }

    pub fn check_payload_len(&self, actual: u64) -> Result<()> {
        if actual != self.payload_len() {
            return Err(HuffError::corrupt(format!(
                "payload is {} bytes but {} bits were recorded",
                actual, self.bit_length
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| HuffError::Encoding(format!("tree artifact: {}", e)))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let artifact: TreeArtifact = bincode::deserialize(data)
            .map_err(|e| HuffError::corrupt(format!("tree artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<()> {
        if self.magic != ARTIFACT_MAGIC {
            return Err(HuffError::corrupt("not a tree artifact"));
        }
        if self.version != ARTIFACT_VERSION {
            return Err(HuffError::corrupt(format!(
                "unsupported tree artifact version {}",
                self.version
            )));
        }
        match (&self.tree, self.symbol_count) {
            (None, 0) if self.bit_length == 0 => Ok(()),
            (None, _) => Err(HuffError::corrupt("symbols recorded without a tree")),
            (Some(_), 0) => Err(HuffError::corrupt("tree recorded without symbols")),
            // every code is at least one bit long
            (Some(_), n) if self.bit_length < n => Err(HuffError::corrupt(format!(
                "{} bits cannot hold {} symbols",
                self.bit_length, n
            ))),
            // and at most MAX_CODE_LEN bits
            (Some(_), n)
                if n.checked_mul(u64::from(MAX_CODE_LEN))
                    .is_some_and(|max_bits| self.bit_length > max_bits) =>
            {
                Err(HuffError::corrupt(format!(
                    "{} bits is more than {} symbols can occupy",
                    self.bit_length, n
                )))
            }
            (Some(_), _) => Ok(()),
        }
    }
}

/// Payload plus tree artifact, as produced by an in-memory compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub payload: Vec<u8>,
    pub artifact: TreeArtifact,
}

impl Compressed {
    /// Single-file layout: magic, u32 LE artifact length, artifact, payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header = self.artifact.to_bytes()?;
        let header_len = u32::try_from(header.len())
            .map_err(|_| HuffError::Encoding("tree artifact too large".into()))?;
        let mut out = Vec::with_capacity(8 + header.len() + self.payload.len());
        out.extend_from_slice(&CONTAINER_MAGIC);
        out.extend_from_slice(&header_len.to_le_bytes());
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || data[..4] != CONTAINER_MAGIC {
            return Err(HuffError::corrupt("missing container header"));
        }
        let header_len = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
        let body = &data[8..];
        if header_len > body.len() {
            return Err(HuffError::corrupt("truncated container header"));
        }
        let artifact = TreeArtifact::from_bytes(&body[..header_len])?;
        let payload = body[header_len..].to_vec();
        artifact.check_payload_len(payload.len() as u64)?;
        Ok(Self { payload, artifact })
    }
}
