//! # Byte-oriented Huffman coding
//!
//! *Optimal prefix codes over the full 256-symbol byte alphabet.*
//!
//! ## Intuition First
//!
//! Morse code already knew the trick: give the common letters the short
//! signals. Huffman coding does the same for bytes, but derives the
//! assignment from the data itself. Count how often each byte value
//! occurs, then repeatedly glue the two rarest things together until one
//! tree remains. The path from the root to each byte's leaf, read as
//! 0 = left and 1 = right, is that byte's code: frequent bytes end up
//! near the root with short codes, rare bytes sink deep.
//!
//! Because every code sits at a leaf, no code is a prefix of another,
//! and a decoder can consume the packed bit stream unambiguously by
//! walking the same tree bit by bit.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon      Entropy as the fundamental limit
//! 1949  Shannon-Fano Top-down splitting: close, but not optimal
//! 1952  Huffman      Bottom-up merging: provably optimal prefix codes
//! 1977  Ziv-Lempel   Dictionary methods take over the front end
//! 1993  DEFLATE      Huffman as the back end of zip/gzip/png
//! ```
//!
//! David Huffman found the bottom-up construction as a graduate student,
//! sidestepping the top-down Shannon-Fano approach his professor (Fano)
//! had been stuck on. Greedily merging the two least-weighted subtrees
//! is exchange-argument optimal among all prefix codes.
//!
//! ## Complexity Analysis
//!
//! - **Tree construction**: O(n^2) here via linear scans over a fixed
//!   n = 256 alphabet; a priority queue would give O(n log n) for
//!   variable alphabets.
//! - **Transcoding**: O(1) amortized per emitted bit in both directions.
//!
//! ## Failure Modes
//!
//! 1. **Skewed trees**: adversarial weight distributions grow codes up
//!    to 255 bits; the table extractor checks its per-entry byte budget
//!    and refuses to truncate.
//! 2. **Stream framing**: the packed payload has no end marker. The
//!    encoder pads the final byte with a strict prefix of a longer code
//!    so the decoder parks on an internal node instead of inventing a
//!    trailing symbol.
//!
//! ## Implementation Notes
//!
//! The tree lives in a fixed 511-slot arena addressed by index, never by
//! pointer; the code table stores MSB-first packed codes; reader and
//! writer bit cursors wrap any `Read`/`Write`. By default the serialized
//! code table is embedded ahead of the payload so compressed output is
//! self-describing.
//!
//! ```
//! use huffcode::{compress_bytes, decompress_bytes};
//!
//! let data = b"abracadabra";
//! let packed = compress_bytes(data).unwrap();
//! assert_eq!(decompress_bytes(&packed).unwrap(), data);
//! ```
//!
//! ## References
//!
//! - Huffman, D. (1952). "A Method for the Construction of
//!   Minimum-Redundancy Codes."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bits;
pub mod code;
pub mod error;
pub mod freq;
pub mod huffman;
pub mod tree;

pub use bits::{BitReader, BitWriter};
pub use code::CodeTable;
pub use error::Error;
pub use huffman::{compress_bytes, decompress_bytes, HuffmanDecoder, HuffmanEncoder};
pub use tree::{Node, Tree, NODE_COUNT, SYMBOL_COUNT};
