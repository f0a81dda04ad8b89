//! Per-symbol code table extracted from the coding tree.
//!
//! Each of the 256 symbols gets a bit length and a code packed MSB-first
//! into a fixed number of bytes per entry (the byte budget of the longest
//! code). Left branches contribute bit 0, right branches bit 1, so the
//! code of a symbol spells the root-to-leaf path and the full set is
//! prefix-free by construction.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};
use crate::tree::{Node, Tree, NODE_COUNT, SYMBOL_COUNT};

/// Bit lengths and MSB-first packed codes for all 256 symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    /// Bytes reserved per entry; every code fits this budget.
    entry_size: usize,
    /// Code length in bits per symbol.
    lens: Vec<u8>,
    /// `SYMBOL_COUNT * entry_size` bytes of packed codes.
    codes: Vec<u8>,
}

impl CodeTable {
    /// Extract the code table from a built tree.
    ///
    /// Nodes are processed in increasing arena index, which visits every
    /// internal node before its children (children always have larger
    /// indices by construction). Each internal node hands its partial
    /// code and depth to both children, appending 0 on the left edge and
    /// 1 on the right edge at the bit position equal to its own depth.
    /// Reaching a leaf records the accumulated code as final.
    pub fn from_tree(tree: &Tree) -> Result<Self> {
        // First pass: depths only, to size the per-entry byte budget.
        let mut depth = vec![0u16; NODE_COUNT];
        let mut max_len = 0usize;
        for i in 0..NODE_COUNT as u16 {
            match tree.node(i) {
                Node::Internal { left, right } => {
                    depth[left as usize] = depth[i as usize] + 1;
                    depth[right as usize] = depth[i as usize] + 1;
                }
                Node::Leaf { .. } => max_len = max_len.max(depth[i as usize] as usize),
            }
        }

        let entry_size = max_len.div_ceil(8);
        // A degenerate distribution could in principle need more storage
        // per entry than the table reserves; surface that instead of
        // truncating codes.
        if entry_size >= SYMBOL_COUNT {
            return Err(Error::CodeLengthOverflow {
                needed: entry_size,
                budget: SYMBOL_COUNT - 1,
            });
        }

        // Second pass: propagate partial codes top-down. The scratch
        // buffer holds one entry per arena node and is dropped with
        // this scope.
        let mut scratch = vec![0u8; NODE_COUNT * entry_size];
        let mut lens = vec![0u8; SYMBOL_COUNT];
        let mut codes = vec![0u8; SYMBOL_COUNT * entry_size];

        for i in 0..NODE_COUNT {
            match tree.node(i as u16) {
                Node::Internal { left, right } => {
                    let (parent, rest) = scratch.split_at_mut((i + 1) * entry_size);
                    let parent = &parent[i * entry_size..];
                    for child in [left as usize, right as usize] {
                        let off = (child - i - 1) * entry_size;
                        rest[off..off + entry_size].copy_from_slice(parent);
                    }
                    // Left inherits 0 at the new position; right gets 1.
                    let d = depth[i] as usize;
                    let off = (right as usize - i - 1) * entry_size;
                    rest[off + d / 8] |= 0x80 >> (d % 8);
                }
                Node::Leaf { symbol } => {
                    let s = symbol as usize;
                    lens[s] = depth[i] as u8;
                    codes[s * entry_size..(s + 1) * entry_size]
                        .copy_from_slice(&scratch[i * entry_size..(i + 1) * entry_size]);
                }
            }
        }

        Ok(CodeTable {
            entry_size,
            lens,
            codes,
        })
    }

    /// Code length in bits for `symbol`.
    pub fn len(&self, symbol: u8) -> usize {
        self.lens[symbol as usize] as usize
    }

    /// Whether `symbol` has a zero-length code. Never true for tables
    /// extracted from a full 256-leaf tree.
    pub fn is_empty(&self, symbol: u8) -> bool {
        self.lens[symbol as usize] == 0
    }

    /// Bytes reserved per table entry.
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Length in bits of the longest code in the table.
    pub fn max_code_len(&self) -> usize {
        self.lens.iter().copied().max().unwrap_or(0) as usize
    }

    /// Bit `pos` (0-based from the most significant end) of the code
    /// for `symbol`.
    pub fn bit(&self, symbol: u8, pos: usize) -> u8 {
        debug_assert!(pos < self.len(symbol));
        let byte = self.codes[symbol as usize * self.entry_size + pos / 8];
        (byte >> (7 - pos % 8)) & 1
    }

    /// First symbol whose code is strictly longer than `bits`.
    ///
    /// Used to pick a padding donor for the final partial byte: a strict
    /// prefix of a longer code can never complete a leaf path on its own.
    pub fn symbol_longer_than(&self, bits: usize) -> Option<u8> {
        (0..SYMBOL_COUNT).find(|&s| self.lens[s] as usize > bits).map(|s| s as u8)
    }

    /// Size in bytes of the serialized table prefix: the `u16` symbol
    /// count, one length byte per symbol, and `ceil(len / 8)` code
    /// bytes per symbol.
    pub fn serialized_len(&self) -> usize {
        2 + SYMBOL_COUNT
            + self
                .lens
                .iter()
                .map(|&l| (l as usize).div_ceil(8))
                .sum::<usize>()
    }

    /// Write the self-describing table prefix: symbol count as `u16`
    /// little-endian, 256 code lengths, then each code packed MSB-first
    /// into `ceil(len / 8)` bytes.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_all(&(SYMBOL_COUNT as u16).to_le_bytes())?;
        sink.write_all(&self.lens)?;
        for s in 0..SYMBOL_COUNT {
            let span = (self.lens[s] as usize).div_ceil(8);
            sink.write_all(&self.codes[s * self.entry_size..s * self.entry_size + span])?;
        }
        Ok(())
    }

    /// Parse a table prefix previously written by [`CodeTable::write_to`].
    pub fn read_from<R: Read>(src: &mut R) -> Result<Self> {
        let mut count = [0u8; 2];
        read_framed(src, &mut count, "symbol count")?;
        if u16::from_le_bytes(count) as usize != SYMBOL_COUNT {
            return Err(Error::MalformedTree("unexpected symbol count in table"));
        }

        let mut lens = vec![0u8; SYMBOL_COUNT];
        read_framed(src, &mut lens, "code lengths")?;

        let max_len = lens.iter().copied().max().unwrap_or(0) as usize;
        let entry_size = max_len.div_ceil(8);
        if entry_size >= SYMBOL_COUNT {
            return Err(Error::CodeLengthOverflow {
                needed: entry_size,
                budget: SYMBOL_COUNT - 1,
            });
        }

        let mut codes = vec![0u8; SYMBOL_COUNT * entry_size];
        for s in 0..SYMBOL_COUNT {
            let span = (lens[s] as usize).div_ceil(8);
            read_framed(
                src,
                &mut codes[s * entry_size..s * entry_size + span],
                "packed codes",
            )?;
        }

        Ok(CodeTable {
            entry_size,
            lens,
            codes,
        })
    }
}

fn read_framed<R: Read>(src: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    src.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            Error::TruncatedStream(what)
        } else {
            Error::Io(e)
        }
    })
}
