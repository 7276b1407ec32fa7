//! Huffman tree construction
//!
//! Leaves are seeded in ascending byte order and merged smallest-first out of a
//! binary heap. Ties on weight are broken by a per-node sequence number (the
//! byte value for leaves, `256 + merge index` for internal nodes), so the same
//! frequency table always yields the same tree shape.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Internal node owning both children; its weight is their sum.
    pub fn merge(left: Node, right: Node) -> Self {
        Node::Internal {
            weight: left.weight().saturating_add(right.weight()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Child reached by `bit` (false = left, true = right). `None` on a leaf.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some(if bit { right } else { left }),
        }
    }

    /// Same shape and leaf symbols, ignoring weights.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf { symbol: a, .. }, Node::Leaf { symbol: b, .. }) => a == b,
            (
                Node::Internal { left: l1, right: r1, .. },
                Node::Internal { left: l2, right: r2, .. },
            ) => l1.same_shape(l2) && r1.same_shape(r2),
            _ => false,
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Heap slot; orders by `(weight, seq)` with the smallest on top.
#[derive(Debug)]
struct HeapEntry {
    weight: u64,
    seq: u32,
    node: Node,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap
        (other.weight, other.seq).cmp(&(self.weight, self.seq))
    }
}

/// A Huffman tree with at least two leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the tree for a frequency table.
    ///
    /// A table with a single symbol gets a zero-weight placeholder sibling,
    /// `symbol + 1` (mod 256), so the real symbol still receives the 1-bit code `0`.
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        if table.distinct() == 1 {
            if let Some((symbol, weight)) = table.iter().next() {
                return Ok(Self {
                    root: Node::merge(
                        Node::leaf(symbol, weight),
                        Node::leaf(symbol.wrapping_add(1), 0),
                    ),
                });
            }
        }

        let mut heap: BinaryHeap<HeapEntry> = table
            .iter()
            .map(|(symbol, weight)| HeapEntry {
                weight,
                seq: symbol as u32,
                node: Node::leaf(symbol, weight),
            })
            .collect();

        if heap.is_empty() {
            return Err(HuffError::InvalidInput(
                "cannot build a tree from an empty frequency table".into(),
            ));
        }

        let mut next_seq = 256u32;
        while heap.len() > 1 {
            let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
                break;
            };
            let node = Node::merge(left.node, right.node);
            heap.push(HeapEntry {
                weight: node.weight(),
                seq: next_seq,
                node,
            });
            next_seq += 1;
        }

        let root = heap
            .pop()
            .map(|entry| entry.node)
            .ok_or_else(|| HuffError::Encoding("heap drained during tree construction".into()))?;
        tracing::debug!(
            symbols = root.leaf_count(),
            depth = root.depth(),
            "built huffman tree"
        );
        Ok(Self { root })
    }

    /// Wrap an existing node tree, rejecting a lone leaf.
    pub fn from_root(root: Node) -> Result<Self> {
        if root.is_leaf() {
            return Err(HuffError::corrupt("tree root must be an internal node"));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_symbols(node: &Node, out: &mut Vec<u8>) {
        match node {
            Node::Leaf { symbol, .. } => out.push(*symbol),
            Node::Internal { left, right, .. } => {
                leaf_symbols(left, out);
                leaf_symbols(right, out);
            }
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = HuffmanTree::build(&FrequencyTable::from_bytes(b"")).unwrap_err();
        assert!(matches!(err, HuffError::InvalidInput(_)));
    }

    #[test]
    fn test_single_symbol_gets_placeholder() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&[0x41; 1000])).unwrap();
        assert_eq!(tree.leaf_count(), 2);
        match tree.root() {
            Node::Internal { left, right, .. } => {
                assert_eq!(**left, Node::leaf(0x41, 1000));
                assert_eq!(**right, Node::leaf(0x42, 0));
            }
            Node::Leaf { .. } => panic!("root must be internal"),
        }
    }

    #[test]
    fn test_placeholder_wraps_at_255() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&[0xFF; 3])).unwrap();
        let mut symbols = Vec::new();
        leaf_symbols(tree.root(), &mut symbols);
        assert_eq!(symbols, vec![0xFF, 0x00]);
    }

    #[test]
    fn test_single_symbol_zero_byte() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&[0x00; 4])).unwrap();
        let mut symbols = Vec::new();
        leaf_symbols(tree.root(), &mut symbols);
        assert_eq!(symbols, vec![0x00, 0x01]);
        assert_eq!(tree.root().weight(), 4);
    }

    #[test]
    fn test_root_weight_is_total() {
        let data = b"abracadabra";
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap();
        assert_eq!(tree.root().weight(), data.len() as u64);
        assert_eq!(tree.leaf_count(), 5);
    }

    #[test]
    fn test_deterministic_shape() {
        let table = FrequencyTable::from_bytes(b"aabbccddeeffgg");
        let a = HuffmanTree::build(&table).unwrap();
        let b = HuffmanTree::build(&table).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ties_prefer_lower_byte_on_left() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"ba")).unwrap();
        let mut symbols = Vec::new();
        leaf_symbols(tree.root(), &mut symbols);
        assert_eq!(symbols, vec![b'a', b'b']);
    }

    #[test]
    fn test_lone_leaf_root_rejected() {
        let err = HuffmanTree::from_root(Node::leaf(1, 1)).unwrap_err();
        assert!(matches!(err, HuffError::CorruptStream(_)));
    }

    #[test]
    fn test_same_shape_ignores_weight() {
        let a = Node::merge(Node::leaf(1, 10), Node::leaf(2, 20));
        let b = Node::merge(Node::leaf(1, 0), Node::leaf(2, 0));
        let c = Node::merge(Node::leaf(2, 0), Node::leaf(1, 0));
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }
}
