//! huffpack: lossless byte-stream compression with Huffman coding.
//!
//! The encode path counts byte frequencies, builds a deterministic Huffman
//! tree, derives a prefix code per byte and packs the code words MSB-first.
//! The tree is stored separately (or as a header) along with the exact symbol
//! count, which is what tells the decoder where the payload ends.
//!
//! - [`codec`] works on in-memory buffers
//! - [`stream`] works on async readers and files with bounded memory
//! - [`gzip`] is a general-purpose alternative selectable via [`CompressionMethod`]

pub mod artifact;
pub mod bit_packer;
pub mod bit_unpacker;
pub mod code_table;
pub mod codec;
pub mod config;
pub mod error;
pub mod frequency;
pub mod gzip;
pub mod stream;
pub mod tree;
pub mod tree_codec;

pub use crate::artifact::{Compressed, TreeArtifact};
pub use crate::code_table::{Code, CodeTable};
pub use crate::config::{CodecConfig, TreeFormat};
pub use crate::error::{ErrorKind, HuffError, Result};
pub use crate::frequency::{FrequencyCounter, FrequencyTable};
pub use crate::tree::{HuffmanTree, Node};

/// Compression method selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompressionMethod {
    Huffman,
    Gzip,
}

/// Compressed output container
#[derive(Debug, Clone)]
pub struct CompressedOutput {
    pub method: CompressionMethod,
    pub original_size: usize,
    pub compressed_size: usize,
    pub data: Vec<u8>,
    pub ratio: f64,
}

/// The main compressor engine
pub struct Compressor {
    config: CodecConfig,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Compressor {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compress data using the specified method. Huffman output uses the
    /// single-file container so it can be decoded on its own.
    pub fn compress(&self, data: &[u8], method: CompressionMethod) -> Result<CompressedOutput> {
        let compressed = match method {
            CompressionMethod::Huffman => codec::compress(data, &self.config)?.to_bytes()?,
            CompressionMethod::Gzip => gzip::compress(data, self.config.gzip_level)?,
        };

        let ratio = if data.is_empty() {
            1.0
        } else {
            compressed.len() as f64 / data.len() as f64
        };

        Ok(CompressedOutput {
            method,
            original_size: data.len(),
            compressed_size: compressed.len(),
            data: compressed,
            ratio,
        })
    }

    pub fn decompress(&self, output: &CompressedOutput) -> Result<Vec<u8>> {
        let data = match output.method {
            CompressionMethod::Huffman => {
                let container = Compressed::from_bytes(&output.data)?;
                codec::decompress(&container.payload, &container.artifact)?
            }
            CompressionMethod::Gzip => gzip::decompress(&output.data)?,
        };
        if data.len() != output.original_size {
            return Err(HuffError::corrupt(format!(
                "decompression size mismatch: expected {}, got {}",
                output.original_size,
                data.len()
            )));
        }
        Ok(data)
    }
}
