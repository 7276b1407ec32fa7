//! Bounded-memory streaming over async I/O
//!
//! Encoding makes two passes over a seekable source: one to count bytes, one
//! to pack them. Both read `chunk_size` bytes at a time and the packer is
//! drained whenever `flush_size` bytes are ready, so memory use does not grow
//! with the input. File jobs write to `<path>.incomplete` and only rename the
//! result into place once the whole job has succeeded.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::artifact::TreeArtifact;
use crate::bit_packer::BitPacker;
use crate::bit_unpacker::TreeWalker;
use crate::code_table::CodeTable;
use crate::config::CodecConfig;
use crate::error::{HuffError, Result};
use crate::frequency::{FrequencyCounter, FrequencyTable};
use crate::tree::HuffmanTree;

const INCOMPLETE_SUFFIX: &str = "incomplete";

/// Output locations of a finished compression job.
#[derive(Debug, Clone)]
pub struct FileJob {
    pub compressed: PathBuf,
    pub tree: PathBuf,
    pub artifact: TreeArtifact,
}

pub async fn count_frequencies<R>(reader: &mut R, chunk_size: usize) -> Result<FrequencyTable>
where
    R: AsyncRead + Unpin,
{
    let mut counter = FrequencyCounter::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        counter.update(&buf[..n]);
    }
    Ok(counter.finish())
}

/// Pack every byte of `reader` with `codes`. Returns `(symbols, bit_length)`.
pub async fn encode_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
    codes: &CodeTable,
    config: &CodecConfig,
) -> Result<(u64, u64)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut packer = BitPacker::new(config.flush_size);
    let mut buf = vec![0u8; config.chunk_size.max(1)];
    let mut flushes = 0usize;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        packer.push_bytes(codes, &buf[..n])?;
        if packer.should_flush() {
            writer.write_all(&packer.take()).await?;
            flushes += 1;
        }
    }
    let tail = packer.finish();
    writer.write_all(&tail.bytes).await?;
    writer.flush().await?;
    debug!(flushes, symbols = tail.symbols, bits = tail.bit_length, "encoded stream");
    Ok((tail.symbols, tail.bit_length))
}

/// Compress a seekable source into `writer`, returning the tree artifact.
pub async fn compress_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
    config: &CodecConfig,
) -> Result<TreeArtifact>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    let freqs = count_frequencies(reader, config.chunk_size).await?;
    if freqs.is_empty() {
        writer.flush().await?;
        return Ok(TreeArtifact::empty(config.tree_format));
    }
    let tree = HuffmanTree::build(&freqs)?;
    let codes = CodeTable::from_tree(&tree)?;
    debug!(distinct = freqs.distinct(), depth = tree.depth(), "code table ready");

    reader.seek(SeekFrom::Start(0)).await?;
    let (symbols, bit_length) = encode_stream(reader, writer, &codes, config).await?;
    if symbols != freqs.total() {
        return Err(HuffError::Encoding(format!(
            "input changed between passes: counted {} bytes, encoded {}",
            freqs.total(),
            symbols
        )));
    }
    TreeArtifact::new(&tree, config.tree_format, symbols, bit_length)
}

/// Decode a packed payload from `reader` into `writer`. Returns the number of bytes written.
pub async fn decompress_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
    artifact: &TreeArtifact,
    config: &CodecConfig,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(tree) = artifact.tree()? else {
        let mut probe = [0u8; 1];
        if reader.read(&mut probe).await? != 0 {
            return Err(HuffError::corrupt("payload present for an empty input"));
        }
        writer.flush().await?;
        return Ok(0);
    };

    let mut walker = TreeWalker::new(&tree, artifact.symbol_count);
    let mut buf = vec![0u8; config.chunk_size.max(1)];
    let mut out = Vec::with_capacity(config.flush_size);
    let mut read_total = 0u64;
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        read_total += n as u64;
        walker.feed(&buf[..n], &mut out)?;
        if out.len() >= config.flush_size {
            writer.write_all(&out).await?;
            written += out.len() as u64;
            out.clear();
        }
    }
    artifact.check_payload_len(read_total)?;
    let bits = walker.finish()?;
    if bits != artifact.bit_length {
        return Err(HuffError::corrupt(format!(
            "decoded {} symbols from {} bits, expected {} bits",
            artifact.symbol_count, bits, artifact.bit_length
        )));
    }
    writer.write_all(&out).await?;
    written += out.len() as u64;
    writer.flush().await?;
    Ok(written)
}

/// Compress `input` next to itself as `<input>.<compressed_extension>` and
/// `<input>.<tree_extension>`.
pub async fn compress_file(input: &Path, config: &CodecConfig) -> Result<FileJob> {
    let compressed = with_extension(input, &config.compressed_extension);
    let tree = with_extension(input, &config.tree_extension);
    info!(input = %input.display(), "compressing");

    let result = async {
        let mut source = File::open(input).await?;
        let compressed_tmp = incomplete(&compressed);
        let mut sink = File::create(&compressed_tmp).await?;
        let artifact = compress_stream(&mut source, &mut sink, config).await?;
        sink.sync_all().await?;

        let tree_tmp = incomplete(&tree);
        tokio::fs::write(&tree_tmp, artifact.to_bytes()?).await?;

        // tree first: a placed payload always has its tree beside it
        tokio::fs::rename(&tree_tmp, &tree).await?;
        if let Err(e) = tokio::fs::rename(&compressed_tmp, &compressed).await {
            let _ = tokio::fs::remove_file(&tree).await;
            return Err(e.into());
        }
        Ok::<_, HuffError>(artifact)
    }
    .await;

    match result {
        Ok(artifact) => {
            info!(
                compressed = %compressed.display(),
                symbols = artifact.symbol_count,
                bytes = artifact.payload_len(),
                "compressed"
            );
            Ok(FileJob {
                compressed,
                tree,
                artifact,
            })
        }
        Err(e) => {
            warn!(input = %input.display(), error = %e, "compression failed, output left incomplete");
            Err(e)
        }
    }
}

/// Decode `compressed` with the artifact stored at `tree`. Without an explicit
/// `output`, the compressed extension is swapped for the decoded one.
pub async fn decompress_file(
    compressed: &Path,
    tree: &Path,
    output: Option<&Path>,
    config: &CodecConfig,
) -> Result<PathBuf> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => decoded_path(compressed, config),
    };
    info!(compressed = %compressed.display(), "decompressing");

    let result = async {
        let artifact = TreeArtifact::from_bytes(&tokio::fs::read(tree).await?)?;
        let mut source = File::open(compressed).await?;
        let output_tmp = incomplete(&output);
        let mut sink = File::create(&output_tmp).await?;
        let written = decompress_stream(&mut source, &mut sink, &artifact, config).await?;
        sink.sync_all().await?;
        tokio::fs::rename(&output_tmp, &output).await?;
        Ok::<_, HuffError>(written)
    }
    .await;

    match result {
        Ok(written) => {
            info!(output = %output.display(), bytes = written, "decompressed");
            Ok(output)
        }
        Err(e) => {
            warn!(compressed = %compressed.display(), error = %e, "decompression failed, output left incomplete");
            Err(e)
        }
    }
}

/// `a.bin` + `ext` -> `a.bin.ext`
pub fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Path that holds a job's output until it completes.
pub fn incomplete(path: &Path) -> PathBuf {
    with_extension(path, INCOMPLETE_SUFFIX)
}

fn decoded_path(compressed: &Path, config: &CodecConfig) -> PathBuf {
    let suffix = format!(".{}", config.compressed_extension);
    let name = compressed.to_string_lossy();
    match name.strip_suffix(&suffix) {
        Some(stem) if !stem.is_empty() => with_extension(Path::new(stem), &config.decoded_extension),
        _ => with_extension(compressed, &config.decoded_extension),
    }
}
