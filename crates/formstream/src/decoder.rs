//! The pair scanner.
//!
//! [`Decoder::next_pair`] interleaves scanning and refilling so that it never
//! needs more than one window of memory. The price is a hard cap on key
//! length: a key and its delimiter must fit in the window together.
//!
//! The decoder and the [`Value`] of the current pair share the window's scan
//! cursor. `Value` borrows the decoder mutably, so the borrow checker rules out
//! interleaving; a usage state additionally catches a value that was dropped
//! before it was drained.

use alloc::vec::Vec;
use core::fmt;

use bstr::BString;
use log::debug;

use crate::{
    DecodeError, DecoderOptions,
    source::Source,
    value::Value,
    window::Window,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecoderState {
    /// Ready for the next pair.
    Idle,
    /// A value was handed out and has not reached its end yet.
    ValueOpen,
    /// The value reached its end but still holds bytes the caller has not
    /// read; the cursor already sits at the next pair.
    ValueEnded,
    /// A `KeyTooLong` or source error was reported.
    Poisoned,
}

/// One decoded key/value pair.
///
/// The key is copied out of the window verbatim (keys are never
/// percent-decoded). The value is decoded lazily while it is read.
pub struct Pair<'a, S: Source> {
    /// Raw key bytes.
    pub key: BString,
    /// Lazily decoded value; drain it before asking for the next pair.
    pub value: Value<'a, S>,
}

/// Incremental decoder for `application/x-www-form-urlencoded` streams.
///
/// # Examples
///
/// ```rust
/// use formstream::Decoder;
///
/// let mut decoder = Decoder::new(&b"name=J%C3%BCrgen&lang=de+AT"[..]);
///
/// let mut pair = decoder.next_pair().unwrap().expect("a pair");
/// assert_eq!(pair.key, "name");
/// assert_eq!(pair.value.to_bstring().unwrap(), "Jürgen");
///
/// let mut pair = decoder.next_pair().unwrap().expect("a pair");
/// assert_eq!(pair.key, "lang");
/// assert_eq!(pair.value.to_bstring().unwrap(), "de AT");
///
/// assert!(decoder.next_pair().unwrap().is_none());
/// ```
pub struct Decoder<S: Source> {
    pub(crate) source: S,
    pub(crate) window: Window<S::Error>,
    pub(crate) state: DecoderState,
}

impl<S: Source> Decoder<S> {
    /// Creates a decoder with the default [`DecoderOptions`].
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_options(source, DecoderOptions::default())
    }

    /// Creates a decoder with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `options.window_capacity` is zero.
    #[must_use]
    pub fn with_options(source: S, options: DecoderOptions) -> Self {
        Self {
            source,
            window: Window::new(options.window_capacity),
            state: DecoderState::Idle,
        }
    }

    /// Capacity of the window, which also bounds key length.
    #[must_use]
    pub fn window_capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Unwraps the decoder, returning the source.
    ///
    /// Bytes already pulled into the window are lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Returns the next pair, or `Ok(None)` once the stream is exhausted.
    ///
    /// A key terminated by `&`, or by the end of the stream, gets an empty
    /// value.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UndrainedValue`] if the previous value was dropped
    ///   before it was read to its end. See [`Decoder::discard_value`].
    /// - [`DecodeError::KeyTooLong`] if the window filled up without a
    ///   delimiter.
    /// - [`DecodeError::Source`] if the source failed.
    /// - [`DecodeError::Poisoned`] after any of the two previous errors.
    pub fn next_pair(&mut self) -> Result<Option<Pair<'_, S>>, DecodeError<S::Error>> {
        self.ensure_idle()?;

        self.window.refill(&mut self.source);
        if self.window.is_empty() {
            return match self.window.take_failure() {
                Some(err) => {
                    debug!("source failed between pairs, poisoning decoder");
                    Err(self.poison(DecodeError::Source(err)))
                }
                None => Ok(None),
            };
        }

        let mut searched = 0;
        let key = loop {
            let region = self.window.unconsumed();
            if let Some(pos) = region[searched..]
                .iter()
                .position(|&b| b == b'&' || b == b'=')
            {
                let end = searched + pos;
                let key = BString::from(&region[..end]);
                // `&` stays in the window: the value reads it and ends empty.
                let consumed = if region[end] == b'=' { end + 1 } else { end };
                self.window.consume(consumed);
                break key;
            }
            searched = region.len();

            if self.window.is_full() {
                let capacity = self.window.capacity();
                debug!("no delimiter within {capacity} bytes, poisoning decoder");
                return Err(self.poison(DecodeError::KeyTooLong { capacity }));
            }
            if self.window.at_end() {
                let key = BString::from(region);
                self.window.consume(searched);
                break key;
            }
            // Short read: the source has more, it just has not sent it yet.
            self.window.refill(&mut self.source);
        };

        self.state = DecoderState::ValueOpen;
        Ok(Some(Pair {
            key,
            value: Value::new(self),
        }))
    }

    /// Reads every remaining pair, collecting the decoded values.
    ///
    /// # Errors
    ///
    /// Same as [`Decoder::next_pair`] and [`Value::read`].
    pub fn collect_pairs(&mut self) -> Result<Vec<(BString, BString)>, DecodeError<S::Error>> {
        let mut pairs = Vec::new();
        while let Some(mut pair) = self.next_pair()? {
            let value = pair.value.to_bstring()?;
            pairs.push((pair.key, value));
        }
        Ok(pairs)
    }

    /// Skips the rest of a value that was dropped before it was drained, so
    /// that [`Decoder::next_pair`] can be called again.
    ///
    /// Does nothing if no value is outstanding.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Source`] if the source fails while skipping, and
    /// [`DecodeError::Poisoned`] if the decoder is already poisoned.
    pub fn discard_value(&mut self) -> Result<(), DecodeError<S::Error>> {
        match self.state {
            DecoderState::Idle => Ok(()),
            DecoderState::ValueOpen => Value::new(self).skip(),
            DecoderState::ValueEnded => {
                self.state = DecoderState::Idle;
                Ok(())
            }
            DecoderState::Poisoned => Err(DecodeError::Poisoned),
        }
    }

    fn ensure_idle(&self) -> Result<(), DecodeError<S::Error>> {
        match self.state {
            DecoderState::Idle => Ok(()),
            DecoderState::ValueOpen | DecoderState::ValueEnded => {
                debug!("next pair requested while a value is still open");
                Err(DecodeError::UndrainedValue)
            }
            DecoderState::Poisoned => Err(DecodeError::Poisoned),
        }
    }

    pub(crate) fn poison(&mut self, err: DecodeError<S::Error>) -> DecodeError<S::Error> {
        self.state = DecoderState::Poisoned;
        err
    }
}

impl<S: Source> fmt::Debug for Pair<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

impl<S: Source> fmt::Debug for Decoder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("window_capacity", &self.window.capacity())
            .field("buffered", &self.window.unconsumed().len())
            .field("at_end", &self.window.at_end())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Decoder<crate::ReadSource<R>> {
    /// Creates a decoder over a [`std::io::Read`] with the default options.
    pub fn from_reader(reader: R) -> Self {
        Self::new(crate::ReadSource::new(reader))
    }
}
