//! Gzip pass-through for callers that want a general-purpose compressor
//! instead of the Huffman engine.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{HuffError, Result};

pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut output = Vec::new();
    decoder.read_to_end(&mut output).map_err(corrupt_or_io)?;
    Ok(output)
}

/// Stream `input` through a gzip encoder into `output`. Returns bytes read.
pub fn compress_file(input: &Path, output: &Path, level: u32) -> Result<u64> {
    let mut reader = BufReader::new(File::open(input)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(output)?), Compression::new(level));
    let copied = io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    tracing::info!(input = %input.display(), bytes = copied, "gzip compressed");
    Ok(copied)
}

/// Stream a gzip file back out. Returns bytes written.
pub fn decompress_file(input: &Path, output: &Path) -> Result<u64> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(input)?));
    let mut writer = BufWriter::new(File::create(output)?);
    let copied = io::copy(&mut decoder, &mut writer).map_err(corrupt_or_io)?;
    writer.flush()?;
    tracing::info!(output = %output.display(), bytes = copied, "gzip decompressed");
    Ok(copied)
}

fn corrupt_or_io(e: io::Error) -> HuffError {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            HuffError::corrupt(format!("gzip: {}", e))
        }
        _ => HuffError::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_roundtrip() {
        let data = b"test data for gzip compression roundtrip test data";
        let compressed = compress(data, 6).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_gzip_empty() {
        let compressed = compress(b"", 1).unwrap();
        assert!(decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_gzip_garbage_is_corrupt() {
        let err = decompress(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, HuffError::CorruptStream(_)));
    }

    #[test]
    fn test_gzip_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let packed = dir.path().join("in.txt.gz");
        let output = dir.path().join("out.txt");
        let data = vec![42u8; 200];
        std::fs::write(&input, &data).unwrap();
        assert_eq!(compress_file(&input, &packed, 9).unwrap(), 200);
        assert_eq!(decompress_file(&packed, &output).unwrap(), 200);
        assert_eq!(std::fs::read(&output).unwrap(), data);
    }
}
