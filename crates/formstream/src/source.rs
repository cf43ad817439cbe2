//! Byte sources the decoder pulls from.
//!
//! A [`Source`] hands out bytes one fetch at a time. Unlike
//! [`std::io::Read`], a single fetch can report bytes *and* a terminal
//! condition together, which is how many transports naturally deliver their
//! final chunk. The decoder always consumes the bytes of a fetch before it
//! acts on the accompanying [`Signal`].
//!
//! Contract for implementors:
//! - `fetch` writes at most `buf.len()` bytes into the front of `buf` and
//!   reports how many it wrote in [`Fetch::len`].
//! - A short fetch (fewer bytes than requested, no signal) is allowed and
//!   simply means "nothing more right now"; the decoder will fetch again when
//!   it needs more bytes.
//! - A fetch that writes zero bytes into a non-empty `buf` and reports no
//!   signal is treated as [`Signal::End`], mirroring `Read::read` returning
//!   `Ok(0)`.
//! - Once a signal has been reported the decoder never fetches again.

use alloc::vec::Vec;
use core::convert::Infallible;

/// Terminal condition reported by a [`Source`].
#[derive(Debug, PartialEq, Eq)]
pub enum Signal<E> {
    /// The source has no more bytes.
    End,
    /// The source failed.
    Failed(E),
}

/// Result of one [`Source::fetch`] call.
///
/// `len` bytes were written into the destination. They must be consumed
/// before `signal` is acted upon.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Fetch<E> {
    /// Number of bytes written into the destination.
    pub len: usize,
    /// Terminal condition reported alongside the bytes, if any.
    pub signal: Option<Signal<E>>,
}

impl<E> Fetch<E> {
    /// `len` bytes were written; the source may have more.
    pub fn more(len: usize) -> Self {
        Self { len, signal: None }
    }

    /// `len` bytes were written and the source is exhausted.
    pub fn end(len: usize) -> Self {
        Self {
            len,
            signal: Some(Signal::End),
        }
    }

    /// `len` bytes were written before the source failed with `err`.
    pub fn failed(len: usize, err: E) -> Self {
        Self {
            len,
            signal: Some(Signal::Failed(err)),
        }
    }
}

/// A sequential provider of raw form-encoded bytes.
///
/// See the [module documentation](self) for the fetch contract.
pub trait Source {
    /// Error reported through [`Signal::Failed`].
    type Error;

    /// Writes up to `buf.len()` bytes into `buf`.
    fn fetch(&mut self, buf: &mut [u8]) -> Fetch<Self::Error>;
}

impl<S: Source + ?Sized> Source for &mut S {
    type Error = S::Error;

    #[inline]
    fn fetch(&mut self, buf: &mut [u8]) -> Fetch<Self::Error> {
        (**self).fetch(buf)
    }
}

/// Reads from an in-memory slice, reporting [`Signal::End`] together with the
/// final bytes.
impl Source for &[u8] {
    type Error = Infallible;

    fn fetch(&mut self, buf: &mut [u8]) -> Fetch<Self::Error> {
        let len = self.len().min(buf.len());
        let (head, tail) = self.split_at(len);
        buf[..len].copy_from_slice(head);
        *self = tail;
        if self.is_empty() {
            Fetch::end(len)
        } else {
            Fetch::more(len)
        }
    }
}

/// A source that delivers a fixed sequence of chunks, at most one chunk per
/// fetch.
///
/// Useful for modelling slow or fragmented transports: a chunk larger than the
/// destination is split across several fetches, but two chunks are never
/// merged into one fetch. Empty chunks are skipped.
///
/// ```rust
/// use formstream::{ChunkedSource, Decoder};
///
/// let source = ChunkedSource::new([&b"a=%"[..], b"4", b"1"]);
/// let mut decoder = Decoder::new(source);
/// let pairs = decoder.collect_pairs().unwrap();
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(pairs[0].0, "a");
/// assert_eq!(pairs[0].1, "A");
/// ```
#[derive(Debug, Clone)]
pub struct ChunkedSource<'a> {
    chunks: Vec<&'a [u8]>,
    next: usize,
    offset: usize,
    eager_end: bool,
}

impl<'a> ChunkedSource<'a> {
    /// Creates a source that yields `chunks` in order, then reports
    /// [`Signal::End`] from a separate, empty fetch.
    pub fn new<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        Self {
            chunks: chunks.into_iter().collect(),
            next: 0,
            offset: 0,
            eager_end: false,
        }
    }

    /// Reports [`Signal::End`] in the same fetch that delivers the last byte.
    #[must_use]
    pub fn with_eager_end(mut self) -> Self {
        self.eager_end = true;
        self
    }

    fn skip_exhausted(&mut self) {
        while self
            .chunks
            .get(self.next)
            .is_some_and(|chunk| self.offset == chunk.len())
        {
            self.next += 1;
            self.offset = 0;
        }
    }
}

impl Source for ChunkedSource<'_> {
    type Error = Infallible;

    fn fetch(&mut self, buf: &mut [u8]) -> Fetch<Self::Error> {
        self.skip_exhausted();
        let Some(chunk) = self.chunks.get(self.next) else {
            return Fetch::end(0);
        };
        let rest = &chunk[self.offset..];
        let len = rest.len().min(buf.len());
        buf[..len].copy_from_slice(&rest[..len]);
        self.offset += len;

        self.skip_exhausted();
        if self.eager_end && self.next == self.chunks.len() {
            Fetch::end(len)
        } else {
            Fetch::more(len)
        }
    }
}

#[cfg(feature = "std")]
pub use self::read::ReadSource;

#[cfg(feature = "std")]
mod read {
    use std::io::{ErrorKind, Read};

    use super::{Fetch, Source};

    /// Adapts a [`std::io::Read`] into a [`Source`].
    ///
    /// `Ok(0)` maps to [`Signal::End`](super::Signal::End); reads interrupted
    /// by a signal are retried; every other error is reported as
    /// [`Signal::Failed`](super::Signal::Failed).
    #[derive(Debug)]
    pub struct ReadSource<R> {
        inner: R,
    }

    impl<R> ReadSource<R> {
        /// Wraps `inner`.
        pub fn new(inner: R) -> Self {
            Self { inner }
        }

        /// Returns a reference to the wrapped reader.
        pub fn get_ref(&self) -> &R {
            &self.inner
        }

        /// Unwraps this source, returning the reader.
        pub fn into_inner(self) -> R {
            self.inner
        }
    }

    impl<R: Read> Source for ReadSource<R> {
        type Error = std::io::Error;

        fn fetch(&mut self, buf: &mut [u8]) -> Fetch<Self::Error> {
            loop {
                match self.inner.read(buf) {
                    Ok(0) if !buf.is_empty() => return Fetch::end(0),
                    Ok(len) => return Fetch::more(len),
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(err) => return Fetch::failed(0, err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn slice_reports_end_with_final_bytes() {
        let mut source: &[u8] = b"abcdef";
        let mut buf = [0u8; 4];

        assert_eq!(source.fetch(&mut buf), Fetch::more(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(source.fetch(&mut buf), Fetch::end(2));
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(source.fetch(&mut buf), Fetch::end(0));
    }

    #[test]
    fn chunks_are_never_merged() {
        let mut source = ChunkedSource::new([&b"ab"[..], b"", b"cde"]);
        let mut buf = [0u8; 8];

        assert_eq!(source.fetch(&mut buf), Fetch::more(2));
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(source.fetch(&mut buf), Fetch::more(3));
        assert_eq!(&buf[..3], b"cde");
        assert_eq!(source.fetch(&mut buf), Fetch::end(0));
    }

    #[test]
    fn large_chunk_is_split_across_fetches() {
        let mut source = ChunkedSource::new(vec![&b"abcde"[..]]).with_eager_end();
        let mut buf = [0u8; 3];

        assert_eq!(source.fetch(&mut buf), Fetch::more(3));
        assert_eq!(&buf, b"abc");
        assert_eq!(source.fetch(&mut buf), Fetch::end(2));
        assert_eq!(&buf[..2], b"de");
    }

    #[test]
    fn eager_end_skips_trailing_empty_chunks() {
        let mut source = ChunkedSource::new([&b"ab"[..], b""]).with_eager_end();
        let mut buf = [0u8; 8];

        assert_eq!(source.fetch(&mut buf), Fetch::end(2));
    }

    #[cfg(feature = "std")]
    #[test]
    fn read_source_maps_eof_and_errors() {
        use std::io;

        struct Flaky {
            calls: usize,
        }

        impl io::Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                self.calls += 1;
                match self.calls {
                    1 => Err(io::ErrorKind::Interrupted.into()),
                    2 => {
                        buf[0] = b'x';
                        Ok(1)
                    }
                    3 => Ok(0),
                    _ => Err(io::Error::other("boom")),
                }
            }
        }

        let mut source = ReadSource::new(Flaky { calls: 0 });
        let mut buf = [0u8; 4];

        let fetch = source.fetch(&mut buf);
        assert_eq!((fetch.len, fetch.signal.is_none()), (1, true));
        assert_eq!(source.get_ref().calls, 2);

        assert!(matches!(source.fetch(&mut buf).signal, Some(Signal::End)));
        assert!(matches!(
            source.fetch(&mut buf).signal,
            Some(Signal::Failed(err)) if err.kind() == io::ErrorKind::Other
        ));
    }
}
