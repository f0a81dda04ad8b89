//! Error types for Huffman coding.

use thiserror::Error;

/// Error variants for Huffman tree construction, table extraction,
/// and bit-level transcoding.
#[derive(Debug, Error)]
pub enum Error {
    /// A node has exactly one child. Trees built by this crate always
    /// have full internal nodes; this can only arise when a tree is
    /// rebuilt from an external code table.
    #[error("malformed tree: {0}")]
    MalformedTree(&'static str),

    /// An extracted code needs more storage than the per-entry budget
    /// reserved for it. Signals a degenerate weight distribution.
    #[error("code length overflow: entry needs {needed} bytes, budget is {budget}")]
    CodeLengthOverflow {
        /// Bytes needed to store the longest code.
        needed: usize,
        /// Bytes reserved per table entry.
        budget: usize,
    },

    /// The byte source ended in the middle of a framed structure.
    #[error("truncated stream: {0}")]
    TruncatedStream(&'static str),

    /// A bit writer was closed while holding unflushed bits.
    #[error("bit writer closed with {0} unflushed bits")]
    UnalignedWriteClose(u8),

    /// An I/O error occurred during encoding or decoding.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for Huffman operations.
pub type Result<T> = std::result::Result<T, Error>;
