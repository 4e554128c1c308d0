//! Adapters between pull sources and [`std::io`].

use std::io::{self, Read};

/// A [`Read`] implementation that pulls one byte at a time from an iterator.
///
/// This lets the decoders consume a character-at-a-time source, such as a
/// generator or a byte-producing closure, without buffering it first.
#[derive(Debug, Clone)]
pub struct IterReader<I> {
    source: I,
}

impl<I> IterReader<I> {
    /// Wraps `source`.
    pub const fn new(source: I) -> Self { Self { source } }

    /// Returns the remaining source.
    pub fn into_inner(self) -> I { self.source }
}

impl<I: Iterator<Item = u8>> Read for IterReader<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        for slot in buf.iter_mut() {
            let Some(byte) = self.source.next() else { break };
            *slot = byte;
            filled += 1;
        }
        Ok(filled)
    }
}
