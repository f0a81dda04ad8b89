//! Huffman encoder and decoder.
//!
//! The encoder looks every input byte up in the code table and streams
//! its bits through a [`BitWriter`]; the decoder walks the tree one bit
//! at a time and emits a symbol whenever it lands on a leaf. The packed
//! stream carries no alignment marker, so the encoder pads a trailing
//! partial byte with a strict prefix of some strictly-longer code:
//! prefix-freeness guarantees those bits can never complete a leaf path,
//! and the decoder simply stops at an internal node when the stream
//! runs out.
//!
//! By default the output is self-describing: the serialized code table
//! is written ahead of the payload so the decoder can rebuild the tree
//! without out-of-band state. Disable with [`HuffmanEncoder::embed_table`]
//! when both ends already share the tree.

use std::io::{Cursor, ErrorKind, Read, Seek, Write};

use crate::bits::{BitReader, BitWriter};
use crate::code::CodeTable;
use crate::error::{Error, Result};
use crate::freq;
use crate::tree::{Node, Tree};

/// Huffman encoder: a tree, its extracted code table, and the framing
/// choice.
#[derive(Debug)]
pub struct HuffmanEncoder {
    tree: Tree,
    table: CodeTable,
    embed_table: bool,
}

impl HuffmanEncoder {
    /// Create an encoder from a built tree.
    pub fn new(tree: Tree) -> Result<Self> {
        let table = CodeTable::from_tree(&tree)?;
        Ok(Self {
            tree,
            table,
            embed_table: true,
        })
    }

    /// Build the tree from one counting pass over `src`, leaving the
    /// source rewound for the encoding pass.
    pub fn from_reader<R: Read + Seek>(src: &mut R) -> Result<Self> {
        let weights = freq::weights_from_reader(src)?;
        Self::new(Tree::from_weights(&weights))
    }

    /// Build the tree from in-memory data.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(Tree::from_weights(&freq::weights_from_bytes(data)))
    }

    /// Choose whether the serialized code table prefixes the payload.
    pub fn embed_table(mut self, embed: bool) -> Self {
        self.embed_table = embed;
        self
    }

    /// The coding tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The extracted code table.
    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// Encode every byte of `src` into `sink`; returns the number of
    /// payload bytes written (excluding the table prefix).
    pub fn encode<R: Read, W: Write>(&self, mut src: R, mut sink: W) -> Result<u64> {
        if self.embed_table {
            self.table.write_to(&mut sink)?;
        }

        let mut writer = BitWriter::new(sink);
        let mut chunk = [0u8; 8192];
        loop {
            let n = match src.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &b in &chunk[..n] {
                for pos in 0..self.table.len(b) {
                    writer.write_bit(self.table.bit(b, pos))?;
                }
            }
        }

        self.pad_to_byte(&mut writer)?;
        let written = writer.bytes_written();
        writer.finish()?;
        Ok(written)
    }

    /// Encode an in-memory buffer.
    pub fn encode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(data, &mut out)?;
        Ok(out)
    }

    /// Expected compressed-to-original size ratio for `data` under this
    /// table, table prefix included when embedding is on. Returns 0.0
    /// for empty input.
    pub fn estimate_ratio(&self, data: &[u8]) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let payload_bits: u64 = data.iter().map(|&b| self.table.len(b) as u64).sum();
        let mut bytes = payload_bits.div_ceil(8);
        if self.embed_table {
            bytes += self.table.serialized_len() as u64;
        }
        bytes as f64 / data.len() as f64
    }

    /// Fill a trailing partial byte with a strict prefix of a code
    /// longer than the remaining gap. No shorter complete code can match
    /// those bits, so the decoder ends at an internal node instead of
    /// emitting a spurious trailing symbol.
    fn pad_to_byte<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        let pending = writer.pending_bits();
        if pending == 0 {
            return Ok(());
        }
        let needed = (8 - pending) as usize;
        // A 256-leaf tree always has some code of length >= 8 > needed.
        let donor = self
            .table
            .symbol_longer_than(needed)
            .ok_or(Error::MalformedTree("no code long enough to pad with"))?;
        for pos in 0..needed {
            writer.write_bit(self.table.bit(donor, pos))?;
        }
        Ok(())
    }
}

/// Huffman decoder: a tree-walk state machine.
#[derive(Debug)]
pub struct HuffmanDecoder {
    tree: Tree,
}

impl HuffmanDecoder {
    /// Create a decoder around a tree shared out-of-band, for streams
    /// encoded without an embedded table.
    pub fn new(tree: Tree) -> Self {
        Self { tree }
    }

    /// Parse the embedded table prefix from `src` and rebuild the tree;
    /// the payload follows in the same stream.
    pub fn from_stream<R: Read>(src: &mut R) -> Result<Self> {
        let table = CodeTable::read_from(src)?;
        Ok(Self {
            tree: Tree::from_code_table(&table)?,
        })
    }

    /// The decoding tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Decode the packed payload in `src` into `sink`; returns the
    /// number of symbols emitted. Decoding stops when the bit source is
    /// exhausted; whatever internal node the walk is parked on is
    /// discarded, which is exactly where the encoder's padding leaves it.
    pub fn decode<R: Read, W: Write>(&self, src: R, mut sink: W) -> Result<u64> {
        let mut reader = BitReader::new(src);
        let mut out = Vec::with_capacity(8192);
        let mut emitted = 0u64;
        let mut at = Tree::ROOT;

        while let Some(bit) = reader.read_bit()? {
            at = match self.tree.node(at) {
                Node::Internal { left, right } => {
                    if bit == 0 {
                        left
                    } else {
                        right
                    }
                }
                // The root of a 511-node tree is always internal.
                Node::Leaf { .. } => return Err(Error::MalformedTree("walk started on a leaf")),
            };
            if let Node::Leaf { symbol } = self.tree.node(at) {
                out.push(symbol);
                emitted += 1;
                at = Tree::ROOT;
                if out.len() == out.capacity() {
                    sink.write_all(&out)?;
                    out.clear();
                }
            }
        }

        sink.write_all(&out)?;
        Ok(emitted)
    }

    /// Decode an in-memory payload (no table prefix).
    pub fn decode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decode(data, &mut out)?;
        Ok(out)
    }
}

/// Compress `data` into a self-describing buffer: serialized code table
/// followed by the packed payload.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    HuffmanEncoder::from_bytes(data)?.encode_bytes(data)
}

/// Decompress a buffer produced by [`compress_bytes`].
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut src = Cursor::new(data);
    let decoder = HuffmanDecoder::from_stream(&mut src)?;
    let mut out = Vec::new();
    decoder.decode(&mut src, &mut out)?;
    Ok(out)
}
