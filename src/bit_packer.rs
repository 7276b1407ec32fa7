//! Bit packing of code words
//!
//! Bits are emitted most-significant-first. Pending bits live in a 64-bit
//! accumulator; completed bytes go to an output buffer that callers drain with
//! [`BitPacker::take`] once [`BitPacker::should_flush`] reports it is full.

use crate::code_table::{Code, CodeTable};
use crate::error::{HuffError, Result};

/// Largest slice of a code pushed into the accumulator at once.
const SLICE_BITS: u32 = 32;

#[derive(Debug)]
pub struct BitPacker {
    acc: u64,
    acc_bits: u32,
    out: Vec<u8>,
    flush_size: usize,
    bit_length: u64,
    symbols: u64,
}

/// What remains once packing is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTail {
    /// Unflushed bytes, including the zero-padded final byte.
    pub bytes: Vec<u8>,
    /// Meaningful payload bits, excluding padding.
    pub bit_length: u64,
    pub symbols: u64,
}

impl BitPacker {
    pub fn new(flush_size: usize) -> Self {
        let flush_size = flush_size.max(1);
        Self {
            acc: 0,
            acc_bits: 0,
            out: Vec::with_capacity(flush_size),
            flush_size,
            bit_length: 0,
            symbols: 0,
        }
    }

    pub fn push(&mut self, code: Code) {
        let mut remaining = code.len() as u32;
        while remaining > 0 {
            let n = remaining.min(SLICE_BITS);
            let slice = (code.bits() >> (remaining - n)) as u64 & ((1u64 << n) - 1);
            self.acc = (self.acc << n) | slice;
            self.acc_bits += n;
            remaining -= n;
            while self.acc_bits >= 8 {
                self.acc_bits -= 8;
                self.out.push((self.acc >> self.acc_bits) as u8);
            }
            self.acc &= (1u64 << self.acc_bits) - 1;
        }
        self.bit_length += code.len() as u64;
        self.symbols += 1;
    }

    /// Look up and push the code for every byte of `data`.
    pub fn push_bytes(&mut self, codes: &CodeTable, data: &[u8]) -> Result<()> {
        for &b in data {
            let code = codes.get(b).ok_or_else(|| {
                HuffError::Encoding(format!("byte {:#04x} has no code in the table", b))
            })?;
            self.push(code);
        }
        Ok(())
    }

    pub fn should_flush(&self) -> bool {
        self.out.len() >= self.flush_size
    }

    /// Hand over all completed bytes.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.out, Vec::with_capacity(self.flush_size))
    }

    pub fn bit_length(&self) -> u64 {
        self.bit_length
    }

    pub fn symbols(&self) -> u64 {
        self.symbols
    }

    /// Right-pad the partial byte with zeros and return everything left.
    pub fn finish(mut self) -> PackedTail {
        if self.acc_bits > 0 {
            self.out.push((self.acc << (8 - self.acc_bits)) as u8);
            self.acc_bits = 0;
        }
        PackedTail {
            bytes: self.out,
            bit_length: self.bit_length,
            symbols: self.symbols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Code {
        Code::new(u128::from_str_radix(s, 2).unwrap(), s.len() as u8)
    }

    #[test]
    fn test_pack_msb_first_with_padding() {
        let mut packer = BitPacker::new(16);
        for c in ["1", "00", "1", "1", "01"] {
            packer.push(code(c));
        }
        let tail = packer.finish();
        assert_eq!(tail.bytes, vec![0b1001_1010]);
        assert_eq!(tail.bit_length, 7);
        assert_eq!(tail.symbols, 5);
    }

    #[test]
    fn test_exact_byte_has_no_padding_byte() {
        let mut packer = BitPacker::new(16);
        packer.push(code("1010"));
        packer.push(code("0101"));
        assert_eq!(packer.finish().bytes, vec![0b1010_0101]);
    }

    #[test]
    fn test_long_code_spans_slices() {
        let mut packer = BitPacker::new(64);
        let long = Code::new((1u128 << 69) | 1, 70);
        packer.push(long);
        let tail = packer.finish();
        assert_eq!(tail.bit_length, 70);
        assert_eq!(tail.bytes.len(), 9);
        assert_eq!(tail.bytes[0], 0b1000_0000);
        assert!(tail.bytes[1..7].iter().all(|&b| b == 0));
        // bit 69 from the start lands in byte 8 at position 5
        assert_eq!(tail.bytes[8], 0b0000_0100);
    }

    #[test]
    fn test_flush_threshold() {
        let mut packer = BitPacker::new(2);
        for _ in 0..8 {
            packer.push(code("11"));
        }
        assert!(packer.should_flush());
        assert_eq!(packer.take(), vec![0xFF, 0xFF]);
        assert!(!packer.should_flush());
        packer.push(code("1"));
        assert_eq!(packer.finish().bytes, vec![0x80]);
    }

    #[test]
    fn test_missing_code_is_encoding_error() {
        let tree = crate::tree::HuffmanTree::build(
            &crate::frequency::FrequencyTable::from_bytes(b"ab"),
        )
        .unwrap();
        let codes = CodeTable::from_tree(&tree).unwrap();
        let mut packer = BitPacker::new(8);
        assert!(matches!(
            packer.push_bytes(&codes, b"abz"),
            Err(HuffError::Encoding(_))
        ));
    }
}
