//! Symbol frequency counting.
//!
//! One full pass over the byte source yields a weight per possible byte
//! value, normalized by the maximum observed count so the most frequent
//! symbol weighs 1.0 and absent symbols weigh 0.0. Only the relative
//! order of weights matters to tree construction; the normalization
//! keeps them in a predictable range.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::Result;
use crate::tree::SYMBOL_COUNT;

/// Count symbols in `src` and return normalized weights, rewinding the
/// source to the start so the encoding pass can re-read it.
pub fn weights_from_reader<R: Read + Seek>(src: &mut R) -> Result<[f32; SYMBOL_COUNT]> {
    let mut counts = [0u64; SYMBOL_COUNT];
    let mut chunk = [0u8; 8192];
    loop {
        let n = match src.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &b in &chunk[..n] {
            counts[b as usize] += 1;
        }
    }
    src.seek(SeekFrom::Start(0))?;
    Ok(normalize(&counts))
}

/// Slice convenience for in-memory data.
pub fn weights_from_bytes(data: &[u8]) -> [f32; SYMBOL_COUNT] {
    let mut counts = [0u64; SYMBOL_COUNT];
    for &b in data {
        counts[b as usize] += 1;
    }
    normalize(&counts)
}

fn normalize(counts: &[u64; SYMBOL_COUNT]) -> [f32; SYMBOL_COUNT] {
    let mut weights = [0.0f32; SYMBOL_COUNT];
    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return weights;
    }
    for (w, &c) in weights.iter_mut().zip(counts) {
        *w = c as f32 / max as f32;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_most_frequent_symbol_weighs_one() {
        let weights = weights_from_bytes(b"aaab");
        assert_eq!(weights[b'a' as usize], 1.0);
        assert!((weights[b'b' as usize] - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(weights[b'c' as usize], 0.0);
    }

    #[test]
    fn test_relative_order_is_preserved() {
        let weights = weights_from_bytes(b"zzzzyyx");
        assert!(weights[b'z' as usize] > weights[b'y' as usize]);
        assert!(weights[b'y' as usize] > weights[b'x' as usize]);
    }

    #[test]
    fn test_empty_source_gives_zero_weights() {
        let weights = weights_from_bytes(b"");
        assert!(weights.iter().all(|&w| w == 0.0));
    }

    /// Cursor wrapper that fails the first read with `Interrupted`.
    struct InterruptedOnce {
        inner: Cursor<Vec<u8>>,
        fired: bool,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.fired {
                self.fired = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    impl Seek for InterruptedOnce {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut src = InterruptedOnce {
            inner: Cursor::new(b"aaab".to_vec()),
            fired: false,
        };
        let weights = weights_from_reader(&mut src).unwrap();
        assert_eq!(weights[b'a' as usize], 1.0);
        assert_eq!(src.inner.position(), 0);
    }

    #[test]
    fn test_reader_is_rewound() {
        let mut src = Cursor::new(b"hello huffman".to_vec());
        let weights = weights_from_reader(&mut src).unwrap();
        assert_eq!(weights[b'h' as usize], 1.0);
        assert_eq!(src.position(), 0);
    }
}
