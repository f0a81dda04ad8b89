//! Bit-granular cursors over byte-oriented streams.
//!
//! Both cursors work MSB-first within each byte. The writer flushes a
//! full byte to its sink automatically; the reader pulls the next byte
//! from its source when the current one is spent, so end of stream is
//! only ever observed at a byte boundary.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};

/// Accumulates single bits and writes whole bytes to the wrapped sink.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    sink: W,
    buf: u8,
    nbits: u8,
    written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Wrap a byte sink.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buf: 0,
            nbits: 0,
            written: 0,
        }
    }

    /// Append one bit (the low bit of `bit`).
    pub fn write_bit(&mut self, bit: u8) -> Result<()> {
        self.buf |= (bit & 1) << (7 - self.nbits);
        self.nbits += 1;
        if self.nbits == 8 {
            self.sink.write_all(&[self.buf])?;
            self.written += 1;
            self.buf = 0;
            self.nbits = 0;
        }
        Ok(())
    }

    /// Number of bits currently held in the partial byte (0..=7).
    pub fn pending_bits(&self) -> u8 {
        self.nbits
    }

    /// Whole bytes flushed to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Close the cursor and hand the sink back.
    ///
    /// Closing with a partial byte in flight is a precondition violation:
    /// the caller must pad to a byte boundary first.
    pub fn finish(self) -> Result<W> {
        if self.nbits != 0 {
            return Err(Error::UnalignedWriteClose(self.nbits));
        }
        Ok(self.sink)
    }
}

/// Serves single bits from the wrapped byte source.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    src: R,
    buf: u8,
    nbits: u8,
}

impl<R: Read> BitReader<R> {
    /// Wrap a byte source.
    pub fn new(src: R) -> Self {
        Self {
            src,
            buf: 0,
            nbits: 0,
        }
    }

    /// Next bit, or `None` once the source is exhausted. Exhaustion can
    /// only surface when a fresh byte is needed, never mid-byte.
    pub fn read_bit(&mut self) -> Result<Option<u8>> {
        if self.nbits == 0 {
            let mut byte = [0u8; 1];
            loop {
                match self.src.read(&mut byte) {
                    Ok(0) => return Ok(None),
                    Ok(_) => break,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            self.buf = byte[0];
            self.nbits = 8;
        }
        self.nbits -= 1;
        Ok(Some((self.buf >> self.nbits) & 1))
    }
}
