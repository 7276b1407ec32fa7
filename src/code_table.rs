//! Prefix codes derived from a Huffman tree

use std::fmt;

use crate::error::{HuffError, Result};
use crate::tree::{HuffmanTree, Node};

/// Longest code a [`Code`] can hold.
pub const MAX_CODE_LEN: u8 = 128;

/// A code word, stored right-aligned: the first bit of the path is the most
/// significant of the low `len` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u128,
    len: u8,
}

impl Code {
    /// `bits` must fit in `len` bits and `len` must not exceed [`MAX_CODE_LEN`].
    pub(crate) fn new(bits: u128, len: u8) -> Self {
        assert!(len <= MAX_CODE_LEN, "code length {} exceeds {}", len, MAX_CODE_LEN);
        assert!(
            len == MAX_CODE_LEN || bits >> len == 0,
            "code bits wider than {} bits",
            len
        );
        Self { bits, len }
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at position `i` from the start of the code; `i < len`.
    fn bit(&self, i: u8) -> bool {
        (self.bits >> (self.len - 1 - i)) & 1 == 1
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len == 0 {
            return true;
        }
        self.len <= other.len && (other.bits >> (other.len - self.len)) == self.bits
    }

    fn child(&self, bit: bool) -> Self {
        Self {
            bits: (self.bits << 1) | bit as u128,
            len: self.len + 1,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Byte value to code word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<Code>; 256],
}

impl CodeTable {
    /// Walk the tree depth-first, appending 0 going left and 1 going right.
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = Self { codes: [None; 256] };
        let mut stack = vec![(tree.root(), Code::new(0, 0))];
        while let Some((node, path)) = stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => {
                    if path.is_empty() {
                        return Err(HuffError::Encoding(format!(
                            "leaf {:#04x} reached with an empty code",
                            symbol
                        )));
                    }
                    if table.codes[*symbol as usize].is_some() {
                        return Err(HuffError::Encoding(format!(
                            "symbol {:#04x} appears in more than one leaf",
                            symbol
                        )));
                    }
                    table.codes[*symbol as usize] = Some(path);
                }
                Node::Internal { left, right, .. } => {
                    if path.len() >= MAX_CODE_LEN {
                        return Err(HuffError::Encoding(format!(
                            "code length exceeds {} bits",
                            MAX_CODE_LEN
                        )));
                    }
                    stack.push((right, path.child(true)));
                    stack.push((left, path.child(false)));
                }
            }
        }
        Ok(table)
    }

    pub fn get(&self, byte: u8) -> Option<Code> {
        self.codes[byte as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(b, code)| code.map(|c| (b as u8, c)))
    }

    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of payload bits needed to encode `counts[b]` copies of each byte `b`.
    pub fn encoded_bits(&self, counts: impl Iterator<Item = (u8, u64)>) -> Option<u64> {
        counts.map(|(b, n)| self.get(b).map(|c| c.len() as u64 * n)).sum()
    }
}
