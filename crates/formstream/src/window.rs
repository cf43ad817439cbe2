//! Fixed-capacity sliding window over a [`Source`].
//!
//! Layout
//! - `buf` is allocated once and never resized.
//! - `[0, scanned)` has already been consumed by the pair scanner or a value.
//! - `[scanned, filled)` is buffered but not yet consumed.
//! - `[filled, capacity)` is free space for the next fetch.
//!
//! Invariants
//! - `0 <= scanned <= filled <= capacity`.
//! - `refill` never discards unconsumed bytes; it only shifts them to index 0.
//! - Once a fetch reports a terminal [`Signal`] it is latched and the source
//!   is never fetched again. Consumers look at the latch only after the
//!   unconsumed region has run dry, so bytes delivered together with a signal
//!   are always seen first.

use alloc::{boxed::Box, vec};

use log::trace;

use crate::source::{Fetch, Signal, Source};

#[derive(Debug)]
pub(crate) struct Window<E> {
    buf: Box<[u8]>,
    scanned: usize,
    filled: usize,
    terminal: Option<Signal<E>>,
}

impl<E> Window<E> {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be at least 1");
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            scanned: 0,
            filled: 0,
            terminal: None,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    /// The buffered-but-unconsumed bytes.
    #[inline]
    pub(crate) fn unconsumed(&self) -> &[u8] {
        &self.buf[self.scanned..self.filled]
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.scanned == self.filled
    }

    /// Marks the next `n` unconsumed bytes as consumed.
    #[inline]
    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(self.scanned + n <= self.filled);
        self.scanned += n;
    }

    /// Consumes and returns the next unconsumed byte.
    #[inline]
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.buf[..self.filled].get(self.scanned)?;
        self.scanned += 1;
        Some(byte)
    }

    /// Whether the source has reported a terminal condition.
    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.terminal.is_some()
    }

    #[inline]
    pub(crate) fn has_failure(&self) -> bool {
        matches!(self.terminal, Some(Signal::Failed(_)))
    }

    /// Hands out a latched source failure, leaving a plain end-of-data behind.
    pub(crate) fn take_failure(&mut self) -> Option<E> {
        match self.terminal.take() {
            Some(Signal::Failed(err)) => {
                self.terminal = Some(Signal::End);
                Some(err)
            }
            other => {
                self.terminal = other;
                None
            }
        }
    }

    /// Compacts the unconsumed bytes to the front and issues at most one fetch
    /// into the free tail. Returns the number of bytes appended.
    ///
    /// The fetch is skipped when the window is full or a terminal signal has
    /// already been latched.
    pub(crate) fn refill<S>(&mut self, source: &mut S) -> usize
    where
        S: Source<Error = E> + ?Sized,
    {
        if self.scanned > 0 {
            self.buf.copy_within(self.scanned..self.filled, 0);
            self.filled -= self.scanned;
            self.scanned = 0;
        }
        if self.terminal.is_some() || self.is_full() {
            return 0;
        }

        let space = self.buf.len() - self.filled;
        let Fetch { len, signal } = source.fetch(&mut self.buf[self.filled..]);
        debug_assert!(len <= space, "source wrote past the destination");
        let len = len.min(space);
        self.filled += len;
        self.terminal = match signal {
            None if len == 0 => Some(Signal::End),
            signal => signal,
        };
        trace!(
            "window refill: fetched {len} bytes, {} buffered, terminal: {}",
            self.filled,
            self.terminal.is_some()
        );
        len
    }
}
