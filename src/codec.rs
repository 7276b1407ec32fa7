//! In-memory Huffman compression and decompression

use crate::artifact::{Compressed, TreeArtifact};
use crate::bit_packer::BitPacker;
use crate::bit_unpacker;
use crate::code_table::CodeTable;
use crate::config::CodecConfig;
use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;
use crate::tree::HuffmanTree;

/// Compress `data` into a packed payload and its tree artifact.
pub fn compress(data: &[u8], config: &CodecConfig) -> Result<Compressed> {
    let freqs = FrequencyTable::from_bytes(data);
    if freqs.is_empty() {
        return Ok(Compressed {
            payload: Vec::new(),
            artifact: TreeArtifact::empty(config.tree_format),
        });
    }

    let tree = HuffmanTree::build(&freqs)?;
    let codes = CodeTable::from_tree(&tree)?;

    let mut packer = BitPacker::new(config.flush_size);
    let mut payload = Vec::new();
    for chunk in data.chunks(config.chunk_size.max(1)) {
        packer.push_bytes(&codes, chunk)?;
        if packer.should_flush() {
            payload.extend_from_slice(&packer.take());
        }
    }
    let tail = packer.finish();
    payload.extend_from_slice(&tail.bytes);

    if codes.encoded_bits(freqs.iter()) != Some(tail.bit_length) {
        return Err(HuffError::Encoding(
            "packed bit length disagrees with the code table".into(),
        ));
    }

    tracing::debug!(
        symbols = tail.symbols,
        bits = tail.bit_length,
        distinct = freqs.distinct(),
        "huffman compress"
    );
    let artifact = TreeArtifact::new(&tree, config.tree_format, tail.symbols, tail.bit_length)?;
    Ok(Compressed { payload, artifact })
}

/// Decode `payload` using the tree and counts recorded in `artifact`.
pub fn decompress(payload: &[u8], artifact: &TreeArtifact) -> Result<Vec<u8>> {
    artifact.check_payload_len(payload.len() as u64)?;
    let Some(tree) = artifact.tree()? else {
        return Ok(Vec::new());
    };
    let mut walker = bit_unpacker::TreeWalker::new(&tree, artifact.symbol_count);
    let mut out = Vec::with_capacity(artifact.symbol_count.min(payload.len() as u64 * 8) as usize);
    walker.feed(payload, &mut out)?;
    let bits = walker.finish()?;
    if bits != artifact.bit_length {
        return Err(HuffError::corrupt(format!(
            "decoded {} symbols from {} bits, expected {} bits",
            artifact.symbol_count, bits, artifact.bit_length
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeFormat;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let compressed = compress(data, &CodecConfig::default()).unwrap();
        decompress(&compressed.payload, &compressed.artifact).unwrap()
    }

    #[test]
    fn test_abaac() {
        let data = [0x41, 0x42, 0x41, 0x41, 0x43];
        let compressed = compress(&data, &CodecConfig::default()).unwrap();
        assert_eq!(compressed.payload, vec![0b1001_1010]);
        assert_eq!(compressed.artifact.symbol_count, 5);
        assert_eq!(compressed.artifact.bit_length, 7);
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_empty() {
        let compressed = compress(b"", &CodecConfig::default()).unwrap();
        assert!(compressed.payload.is_empty());
        assert!(compressed.artifact.tree.is_none());
        assert_eq!(roundtrip(b""), b"");
    }

    #[test]
    fn test_single_repeated_byte() {
        let data = vec![0x41u8; 1000];
        let compressed = compress(&data, &CodecConfig::default()).unwrap();
        assert_eq!(compressed.artifact.bit_length, 1000);
        assert_eq!(compressed.payload.len(), 125);
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_small_chunks_and_flushes() {
        let config = CodecConfig {
            chunk_size: 3,
            flush_size: 1,
            tree_format: TreeFormat::Json,
            ..CodecConfig::default()
        };
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = compress(&data, &config).unwrap();
        assert_eq!(
            decompress(&compressed.payload, &compressed.artifact).unwrap(),
            data
        );
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let data = b"hello world hello world";
        let compressed = compress(data, &CodecConfig::default()).unwrap();
        let short = &compressed.payload[..compressed.payload.len() - 1];
        let err = decompress(short, &compressed.artifact).unwrap_err();
        assert!(matches!(err, HuffError::CorruptStream(_)));
    }

    #[test]
    fn test_symbol_count_mismatch_rejected() {
        let data = b"hello world hello world";
        let mut compressed = compress(data, &CodecConfig::default()).unwrap();
        compressed.artifact.symbol_count -= 1;
        assert!(decompress(&compressed.payload, &compressed.artifact).is_err());
    }
}
