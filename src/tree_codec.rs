//! Tree (de)serialization
//!
//! The binary form is a pre-order walk written MSB-first: a `0` bit for an
//! internal node followed by its left and right subtrees, a `1` bit plus the
//! 8-bit symbol for a leaf, zero-padded to a whole byte. Weights are not
//! stored; decoding only needs the shape and the leaf symbols.

use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::config::TreeFormat;
use crate::error::{HuffError, Result};
use crate::tree::{HuffmanTree, Node};

/// A full binary tree over 256 symbols is never deeper than this.
const MAX_DEPTH: usize = 255;

pub fn serialize(tree: &HuffmanTree, format: TreeFormat) -> Result<Vec<u8>> {
    match format {
        TreeFormat::Binary => to_bits(tree),
        TreeFormat::Json => serde_json::to_vec(tree.root())
            .map_err(|e| HuffError::Encoding(format!("tree json: {}", e))),
    }
}

pub fn deserialize(data: &[u8], format: TreeFormat) -> Result<HuffmanTree> {
    let root = match format {
        TreeFormat::Binary => from_bits(data)?,
        TreeFormat::Json => serde_json::from_slice::<Node>(data)
            .map_err(|e| HuffError::corrupt(format!("tree json: {}", e)))?,
    };
    let mut seen = [false; 256];
    check_leaves(&root, &mut seen, 0)?;
    HuffmanTree::from_root(root)
}

fn to_bits(tree: &HuffmanTree) -> Result<Vec<u8>> {
    let mut writer = BitWriter::endian(Vec::new(), BigEndian);
    write_node(&mut writer, tree.root())?;
    writer.byte_align()?;
    Ok(writer.into_writer())
}

fn write_node<W: BitWrite>(writer: &mut W, node: &Node) -> io::Result<()> {
    match node {
        Node::Leaf { symbol, .. } => {
            writer.write_bit(true)?;
            writer.write(8, *symbol)
        }
        Node::Internal { left, right, .. } => {
            writer.write_bit(false)?;
            write_node(writer, left)?;
            write_node(writer, right)
        }
    }
}

fn from_bits(data: &[u8]) -> Result<Node> {
    let mut reader = BitReader::endian(data, BigEndian);
    let mut consumed = 0usize;
    let root = read_node(&mut reader, 0, &mut consumed)?;

    let expected = (consumed + 7) / 8;
    if data.len() != expected {
        return Err(HuffError::corrupt(format!(
            "tree occupies {} bytes but {} were supplied",
            expected,
            data.len()
        )));
    }
    let pad = expected * 8 - consumed;
    if pad > 0 && data[expected - 1] & ((1u8 << pad) - 1) != 0 {
        return Err(HuffError::corrupt("non-zero padding after tree"));
    }
    Ok(root)
}

fn read_node<R: BitRead>(reader: &mut R, depth: usize, consumed: &mut usize) -> Result<Node> {
    if depth > MAX_DEPTH {
        return Err(HuffError::corrupt("tree nesting too deep"));
    }
    let is_leaf = reader.read_bit().map_err(truncated)?;
    *consumed += 1;
    if is_leaf {
        let symbol: u8 = reader.read(8).map_err(truncated)?;
        *consumed += 8;
        Ok(Node::leaf(symbol, 0))
    } else {
        let left = read_node(reader, depth + 1, consumed)?;
        let right = read_node(reader, depth + 1, consumed)?;
        Ok(Node::merge(left, right))
    }
}

fn check_leaves(node: &Node, seen: &mut [bool; 256], depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(HuffError::corrupt("tree nesting too deep"));
    }
    match node {
        Node::Leaf { symbol, .. } => {
            if std::mem::replace(&mut seen[*symbol as usize], true) {
                return Err(HuffError::corrupt(format!(
                    "symbol {:#04x} appears in more than one leaf",
                    symbol
                )));
            }
            Ok(())
        }
        Node::Internal { left, right, .. } => {
            check_leaves(left, seen, depth + 1)?;
            check_leaves(right, seen, depth + 1)
        }
    }
}

fn truncated(e: io::Error) -> HuffError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        HuffError::corrupt("tree data truncated")
    } else {
        HuffError::Io(e)
    }
}
