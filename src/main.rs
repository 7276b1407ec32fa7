use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use huffpack::stream::{self, with_extension};
use huffpack::{CodecConfig, CodeTable, TreeArtifact};

#[derive(Parser)]
#[command(name = "huffpack", version)]
#[command(about = "Huffman file compressor with a separate tree file", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum MethodArg {
    /// Huffman payload plus tree file (default)
    Huffman,
    /// General-purpose gzip, single output file
    Gzip,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    Compress {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = MethodArg::Huffman)]
        method: MethodArg,
    },
    /// Restore a compressed file
    Decompress {
        input: PathBuf,
        /// Tree file; defaults to the input with the tree extension
        #[arg(short, long)]
        tree: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = MethodArg::Huffman)]
        method: MethodArg,
    },
    /// Print the symbol count and code table stored in a tree file
    Inspect { tree: PathBuf },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => CodecConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CodecConfig::default(),
    };
    config.validate()?;

    match cli.command {
        Commands::Compress { input, method } => match method {
            MethodArg::Huffman => {
                let job = stream::compress_file(&input, &config)
                    .await
                    .with_context(|| format!("compressing {}", input.display()))?;
                println!("{}", job.compressed.display());
                println!("{}", job.tree.display());
            }
            MethodArg::Gzip => {
                let output = with_extension(&input, "gz");
                huffpack::gzip::compress_file(&input, &output, config.gzip_level)
                    .with_context(|| format!("gzipping {}", input.display()))?;
                println!("{}", output.display());
            }
        },
        Commands::Decompress {
            input,
            tree,
            output,
            method,
        } => match method {
            MethodArg::Huffman => {
                let tree = match tree {
                    Some(tree) => tree,
                    None => tree_path_for(&input, &config)?,
                };
                let written = stream::decompress_file(&input, &tree, output.as_deref(), &config)
                    .await
                    .with_context(|| format!("decompressing {}", input.display()))?;
                println!("{}", written.display());
            }
            MethodArg::Gzip => {
                let output = output.unwrap_or_else(|| with_extension(&input, &config.decoded_extension));
                huffpack::gzip::decompress_file(&input, &output)
                    .with_context(|| format!("gunzipping {}", input.display()))?;
                println!("{}", output.display());
            }
        },
        Commands::Inspect { tree } => inspect(&tree)?,
    }
    Ok(())
}

/// `a.bin.compressed` -> `a.bin.tree`
fn tree_path_for(compressed: &Path, config: &CodecConfig) -> anyhow::Result<PathBuf> {
    let name = compressed.to_string_lossy();
    let suffix = format!(".{}", config.compressed_extension);
    match name.strip_suffix(&suffix) {
        Some(stem) if !stem.is_empty() => Ok(with_extension(Path::new(stem), &config.tree_extension)),
        _ => bail!(
            "cannot derive a tree file from {}; pass --tree",
            compressed.display()
        ),
    }
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let artifact = TreeArtifact::from_bytes(&bytes)?;
    println!("format:   {:?}", artifact.format);
    println!("symbols:  {}", artifact.symbol_count);
    println!("bits:     {}", artifact.bit_length);
    println!("payload:  {} bytes", artifact.payload_len());
    if let Some(tree) = artifact.tree()? {
        let codes = CodeTable::from_tree(&tree)?;
        println!("depth:    {}", tree.depth());
        for (byte, code) in codes.iter() {
            println!("  {:#04x}  {}", byte, code);
        }
    }
    Ok(())
}
