//! Tree-walking decoder
//!
//! Packed bytes are fed in chunks; each bit (MSB first) moves one step from the
//! current node, and reaching a leaf emits its symbol and returns to the root.
//! Decoding stops after exactly `symbol_count` symbols, so the zero bits
//! padding the last byte are never read as code.

use crate::error::{HuffError, Result};
use crate::tree::{HuffmanTree, Node};

#[derive(Debug)]
pub struct TreeWalker<'a> {
    root: &'a Node,
    current: &'a Node,
    expected: u64,
    remaining: u64,
    bits_consumed: u64,
}

impl<'a> TreeWalker<'a> {
    pub fn new(tree: &'a HuffmanTree, symbol_count: u64) -> Self {
        Self {
            root: tree.root(),
            current: tree.root(),
            expected: symbol_count,
            remaining: symbol_count,
            bits_consumed: 0,
        }
    }

    /// Decode as much of `chunk` as the symbol budget allows, appending to `out`.
    ///
    /// Fails if a whole byte arrives after the final symbol was emitted.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<u8>) -> Result<()> {
        for &byte in chunk {
            if self.remaining == 0 {
                return Err(HuffError::corrupt(format!(
                    "payload continues past the final symbol ({} symbols, {} bits)",
                    self.expected, self.bits_consumed
                )));
            }
            for shift in (0..8).rev() {
                let bit = (byte >> shift) & 1 == 1;
                self.step(bit, out)?;
                if self.remaining == 0 {
                    break;
                }
            }
        }
        Ok(())
    }

    fn step(&mut self, bit: bool, out: &mut Vec<u8>) -> Result<()> {
        let next = self.current.child(bit).ok_or_else(|| {
            HuffError::corrupt(format!("walk fell off the tree at bit {}", self.bits_consumed))
        })?;
        self.bits_consumed += 1;
        match next {
            Node::Leaf { symbol, .. } => {
                out.push(*symbol);
                self.remaining -= 1;
                self.current = self.root;
            }
            Node::Internal { .. } => self.current = next,
        }
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Confirm every expected symbol was decoded.
    pub fn finish(self) -> Result<u64> {
        if self.remaining > 0 {
            return Err(HuffError::corrupt(format!(
                "stream ended after {} of {} symbols",
                self.expected - self.remaining,
                self.expected
            )));
        }
        Ok(self.bits_consumed)
    }
}
