//! Huffman coding tree over a fixed 256-symbol alphabet.
//!
//! The tree lives in a single index-addressed arena of exactly
//! `2 * 256 - 1 = 511` nodes. Leaves occupy indices 255..=510 (the leaf
//! for symbol `s` sits at `255 + s`), internal nodes fill indices 254
//! down to 0 as they are created, and the root is always index 0.
//! Addressing by index instead of by reference keeps the tree a single
//! contiguous block that is dropped as a unit.

use std::fmt;

use crate::code::CodeTable;
use crate::error::{Error, Result};

/// Size of the symbol alphabet: every possible byte value.
pub const SYMBOL_COUNT: usize = 256;

/// Total number of tree nodes. Every internal node has two children,
/// so a tree with `n` leaves has `2n - 1` nodes.
pub const NODE_COUNT: usize = 2 * SYMBOL_COUNT - 1;

/// Arena index of the first leaf.
const LEAF_BASE: usize = SYMBOL_COUNT - 1;

/// One arena slot: a terminal symbol or a branch holding two child indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Terminal node carrying one byte value.
    Leaf {
        /// The symbol this leaf decodes to.
        symbol: u8,
    },
    /// Branching node; the left edge appends bit 0, the right edge bit 1.
    Internal {
        /// Arena index of the left child.
        left: u16,
        /// Arena index of the right child.
        right: u16,
    },
}

/// Immutable Huffman tree plus the parallel per-node weight array.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    weights: Vec<f32>,
}

impl Tree {
    /// Arena index of the root node.
    pub const ROOT: u16 = 0;

    /// Build the coding tree from one weight per symbol.
    ///
    /// Weights only matter in relative order; they need not be
    /// normalized. Construction performs 255 greedy merges: each round
    /// scans the orphan set (nodes without a parent yet) for the two
    /// smallest weights, parents them under a fresh internal node, and
    /// returns that node to the set. Ties go to the first orphan found
    /// during the linear scan; this pins the exact tree shape for tied
    /// weights but never changes the compression ratio. The scan is
    /// O(n^2) over a fixed 256-entry alphabet, which is cheaper than it
    /// looks; a variable-alphabet coder would want a priority queue.
    pub fn from_weights(weights: &[f32; SYMBOL_COUNT]) -> Self {
        let mut nodes = vec![Node::Leaf { symbol: 0 }; NODE_COUNT];
        let mut w = vec![0.0f32; NODE_COUNT];

        for s in 0..SYMBOL_COUNT {
            nodes[LEAF_BASE + s] = Node::Leaf { symbol: s as u8 };
            w[LEAF_BASE + s] = weights[s];
        }

        let mut orphans: Vec<u16> = (LEAF_BASE..NODE_COUNT).map(|i| i as u16).collect();

        for next in (0..LEAF_BASE).rev() {
            let (first, second) = two_smallest(&orphans, &w);
            // The lightest orphan becomes the right child, matching the
            // merge order of the reference encoder.
            let right = orphans[first];
            let left = orphans[second];

            nodes[next] = Node::Internal { left, right };
            w[next] = w[left as usize] + w[right as usize];

            // Remove the higher position first so the lower stays valid.
            orphans.swap_remove(first.max(second));
            orphans.swap_remove(first.min(second));
            orphans.push(next as u16);
        }

        Tree { nodes, weights: w }
    }

    /// Rebuild a decoding tree from a deserialized code table.
    ///
    /// Each symbol's code is replayed root-to-leaf, allocating internal
    /// nodes on demand. The result is checked for the 0-or-2-children
    /// invariant; a table whose codes collide or leave a branch
    /// half-filled is rejected as malformed.
    pub fn from_code_table(table: &CodeTable) -> Result<Self> {
        // Children are optional during insertion and validated afterwards.
        struct Slot {
            left: Option<u16>,
            right: Option<u16>,
            symbol: Option<u8>,
        }
        let empty = || Slot {
            left: None,
            right: None,
            symbol: None,
        };

        let mut slots: Vec<Slot> = Vec::with_capacity(NODE_COUNT);
        slots.push(empty());

        for s in 0..SYMBOL_COUNT {
            let sym = s as u8;
            let len = table.len(sym);
            if len == 0 {
                return Err(Error::MalformedTree("table contains an empty code"));
            }

            let mut at = 0usize;
            for pos in 0..len {
                if slots[at].symbol.is_some() {
                    return Err(Error::MalformedTree("code descends through a leaf"));
                }
                let bit = table.bit(sym, pos);
                let child = if bit == 0 { slots[at].left } else { slots[at].right };
                at = match child {
                    Some(idx) => idx as usize,
                    None => {
                        let idx = slots.len();
                        if idx >= NODE_COUNT {
                            return Err(Error::MalformedTree("too many nodes for the alphabet"));
                        }
                        slots.push(empty());
                        if bit == 0 {
                            slots[at].left = Some(idx as u16);
                        } else {
                            slots[at].right = Some(idx as u16);
                        }
                        idx
                    }
                };
            }

            let slot = &mut slots[at];
            if slot.symbol.is_some() || slot.left.is_some() || slot.right.is_some() {
                return Err(Error::MalformedTree("two codes share a prefix"));
            }
            slot.symbol = Some(sym);
        }

        if slots.len() != NODE_COUNT {
            return Err(Error::MalformedTree("node count does not match the alphabet"));
        }

        let mut nodes = Vec::with_capacity(NODE_COUNT);
        for slot in &slots {
            let node = match (slot.left, slot.right, slot.symbol) {
                (Some(left), Some(right), None) => Node::Internal { left, right },
                (None, None, Some(symbol)) => Node::Leaf { symbol },
                _ => return Err(Error::MalformedTree("node has exactly one child")),
            };
            nodes.push(node);
        }

        Ok(Tree {
            nodes,
            weights: vec![0.0; NODE_COUNT],
        })
    }

    /// The node stored at `index`.
    pub fn node(&self, index: u16) -> Node {
        self.nodes[index as usize]
    }

    /// The weight of the node at `index`. Reconstructed trees carry
    /// all-zero weights since the table does not persist them.
    pub fn weight(&self, index: u16) -> f32 {
        self.weights[index as usize]
    }

    /// Number of nodes in the arena. Always [`NODE_COUNT`].
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the arena is never empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth of the leaf for `symbol`, walking down from the root.
    ///
    /// Independent of code extraction; used to cross-check extracted
    /// code lengths.
    pub fn leaf_depth(&self, symbol: u8) -> usize {
        fn walk(tree: &Tree, at: u16, symbol: u8, depth: usize) -> Option<usize> {
            match tree.node(at) {
                Node::Leaf { symbol: s } => (s == symbol).then_some(depth),
                Node::Internal { left, right } => walk(tree, left, symbol, depth + 1)
                    .or_else(|| walk(tree, right, symbol, depth + 1)),
            }
        }
        // Every symbol has a leaf by construction.
        walk(self, Self::ROOT, symbol, 0).unwrap_or(0)
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, at: u16, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self.node(at) {
            Node::Leaf { symbol } => {
                writeln!(f, "{pad}weight: {:.4}  sym: {symbol}", self.weight(at))
            }
            Node::Internal { left, right } => {
                writeln!(f, "{pad}weight: {:.4}", self.weight(at))?;
                writeln!(f, "{pad}left:")?;
                self.fmt_node(f, left, indent + 1)?;
                writeln!(f, "{pad}right:")?;
                self.fmt_node(f, right, indent + 1)
            }
        }
    }
}

/// Indented dump of the whole tree, one node per line.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, Self::ROOT, 0)
    }
}

/// Positions (within `orphans`) of the two smallest weights. The first
/// return value is the overall minimum; on ties the lower position wins.
fn two_smallest(orphans: &[u16], w: &[f32]) -> (usize, usize) {
    debug_assert!(orphans.len() >= 2);

    let mut first = 0;
    for (pos, &idx) in orphans.iter().enumerate().skip(1) {
        if w[idx as usize] < w[orphans[first] as usize] {
            first = pos;
        }
    }

    let mut second = usize::MAX;
    for (pos, &idx) in orphans.iter().enumerate() {
        if pos == first {
            continue;
        }
        if second == usize::MAX || w[idx as usize] < w[orphans[second] as usize] {
            second = pos;
        }
    }

    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_weights() -> [f32; SYMBOL_COUNT] {
        [1.0; SYMBOL_COUNT]
    }

    fn count_kinds(tree: &Tree) -> (usize, usize) {
        let mut leaves = 0;
        let mut internal = 0;
        for i in 0..tree.len() {
            match tree.node(i as u16) {
                Node::Leaf { .. } => leaves += 1,
                Node::Internal { .. } => internal += 1,
            }
        }
        (leaves, internal)
    }

    #[test]
    fn test_node_counts() {
        let tree = Tree::from_weights(&uniform_weights());
        assert_eq!(tree.len(), NODE_COUNT);
        let (leaves, internal) = count_kinds(&tree);
        assert_eq!(leaves, SYMBOL_COUNT);
        assert_eq!(internal, SYMBOL_COUNT - 1);
    }

    #[test]
    fn test_every_symbol_has_one_leaf() {
        let mut weights = [0.0f32; SYMBOL_COUNT];
        weights[3] = 1.0;
        weights[200] = 0.5;
        let tree = Tree::from_weights(&weights);

        let mut seen = [0u32; SYMBOL_COUNT];
        for i in 0..tree.len() {
            if let Node::Leaf { symbol } = tree.node(i as u16) {
                seen[symbol as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_children_reachable_exactly_once() {
        let tree = Tree::from_weights(&uniform_weights());
        let mut parented = [0u32; NODE_COUNT];
        for i in 0..tree.len() {
            if let Node::Internal { left, right } = tree.node(i as u16) {
                parented[left as usize] += 1;
                parented[right as usize] += 1;
            }
        }
        assert_eq!(parented[Tree::ROOT as usize], 0);
        assert!(parented[1..].iter().all(|&n| n == 1));
    }

    #[test]
    fn test_internal_weight_is_child_sum() {
        let mut weights = [0.0f32; SYMBOL_COUNT];
        for (s, w) in weights.iter_mut().enumerate() {
            *w = (s % 7) as f32 + 0.25;
        }
        let tree = Tree::from_weights(&weights);
        for i in 0..tree.len() {
            if let Node::Internal { left, right } = tree.node(i as u16) {
                let sum = tree.weight(left) + tree.weight(right);
                assert!((tree.weight(i as u16) - sum).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_heavier_symbol_sits_higher() {
        // Three 'A', one 'B': depth(A) < depth(B).
        let mut weights = [0.0f32; SYMBOL_COUNT];
        weights[0x41] = 1.0;
        weights[0x42] = 1.0 / 3.0;
        let tree = Tree::from_weights(&weights);
        assert!(tree.leaf_depth(0x41) < tree.leaf_depth(0x42));
    }

    #[test]
    fn test_single_symbol_gets_shortest_code() {
        let mut weights = [0.0f32; SYMBOL_COUNT];
        weights[0x7a] = 1.0;
        let tree = Tree::from_weights(&weights);
        let depth = tree.leaf_depth(0x7a);
        for s in 0..SYMBOL_COUNT {
            assert!(tree.leaf_depth(s as u8) >= depth);
        }
    }

    // Serialize a known table and hand-tamper the bytes: layout is a
    // u16 symbol count, 256 code lengths, then each code packed into
    // ceil(len / 8) bytes. The source tree puts 'A' (weight 1.0) at
    // depth 1 and 'B' (weight 0.5) at depth 2.
    fn serialized_table() -> Vec<u8> {
        let mut weights = [0.0f32; SYMBOL_COUNT];
        weights[b'A' as usize] = 1.0;
        weights[b'B' as usize] = 0.5;
        let table = CodeTable::from_tree(&Tree::from_weights(&weights)).unwrap();
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        buf
    }

    fn rebuild(buf: &[u8]) -> Result<Tree> {
        let table = CodeTable::read_from(&mut &buf[..]).unwrap();
        Tree::from_code_table(&table)
    }

    fn code_offset(buf: &[u8], sym: usize) -> usize {
        let mut off = 2 + SYMBOL_COUNT;
        for s in 0..sym {
            off += (buf[2 + s] as usize).div_ceil(8);
        }
        off
    }

    #[test]
    fn test_rejects_zero_length_code() {
        let mut buf = serialized_table();
        buf[2] = 0; // length of symbol 0
        assert!(matches!(rebuild(&buf), Err(Error::MalformedTree(_))));
    }

    #[test]
    fn test_rejects_duplicated_code() {
        let buf = serialized_table();
        let lens: Vec<usize> = buf[2..2 + SYMBOL_COUNT].iter().map(|&l| l as usize).collect();
        // Two distinct symbols with equal lengths, same span either way.
        let (a, b) = (0..SYMBOL_COUNT)
            .flat_map(|a| (a + 1..SYMBOL_COUNT).map(move |b| (a, b)))
            .find(|&(a, b)| lens[a] == lens[b])
            .unwrap();

        let mut buf = buf.clone();
        let (off_a, off_b) = (code_offset(&buf, a), code_offset(&buf, b));
        for i in 0..lens[a].div_ceil(8) {
            buf[off_a + i] = buf[off_b + i];
        }
        assert!(matches!(rebuild(&buf), Err(Error::MalformedTree(_))));
    }

    #[test]
    fn test_rejects_code_descending_through_leaf() {
        // Make 'B' (depth 2) extend 'A' (depth 1): B's walk now crosses
        // A's leaf. A's packed byte already carries a 0 in bit position
        // 1, so copying it over B's byte keeps B's span intact.
        let mut buf = serialized_table();
        assert_eq!(buf[2 + b'A' as usize], 1);
        assert_eq!(buf[2 + b'B' as usize], 2);
        let (off_a, off_b) = (code_offset(&buf, b'A' as usize), code_offset(&buf, b'B' as usize));
        buf[off_b] = buf[off_a];
        assert!(matches!(rebuild(&buf), Err(Error::MalformedTree(_))));
    }

    #[test]
    fn test_rejects_oversized_node_count() {
        // Stretch A's code from 1 to 2 bits (same span): the table now
        // describes 512 nodes, one more than the arena holds.
        let mut buf = serialized_table();
        assert_eq!(buf[2 + b'A' as usize], 1);
        buf[2 + b'A' as usize] = 2;
        assert!(matches!(rebuild(&buf), Err(Error::MalformedTree(_))));
    }

    #[test]
    fn test_display_mentions_leaf_symbols() {
        let mut weights = [0.0f32; SYMBOL_COUNT];
        weights[5] = 1.0;
        let dump = Tree::from_weights(&weights).to_string();
        assert!(dump.contains("sym: 5"));
    }
}
