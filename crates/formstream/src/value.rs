//! Lazily decoded values.
//!
//! A [`Value`] advances the decoder's scan cursor directly and decodes escapes
//! as the caller drains it. It may be drained in slices of any size, down to a
//! single byte; escape memory that is waiting to be flushed survives between
//! calls.

use alloc::vec::Vec;
use core::fmt;

use bstr::BString;
use log::debug;

use crate::{
    DecodeError,
    decoder::{Decoder, DecoderState},
    escape::EscapeDecoder,
    source::Source,
};

/// How the value ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    /// A `&` was consumed.
    Delimiter,
    /// The source ran dry.
    Exhausted,
}

/// The value of one [`Pair`](crate::Pair), decoded on demand.
///
/// `Value` holds the decoder's window exclusively; read it until
/// [`Value::read`] returns `Ok(0)` (or use [`Value::read_to_end`],
/// [`Value::to_bstring`] or [`Value::skip`]) before requesting the next pair.
pub struct Value<'a, S: Source> {
    decoder: &'a mut Decoder<S>,
    escape: EscapeDecoder,
    end: Option<End>,
}

impl<'a, S: Source> Value<'a, S> {
    pub(crate) fn new(decoder: &'a mut Decoder<S>) -> Self {
        Self {
            decoder,
            escape: EscapeDecoder::new(),
            end: None,
        }
    }

    /// Whether the value has been read to its end.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        !matches!(
            self.decoder.state,
            DecoderState::ValueOpen | DecoderState::ValueEnded
        )
    }

    /// Decodes value bytes into `dst`, returning how many were written.
    ///
    /// `Ok(0)` with a non-empty `dst` means the value has ended. The window is
    /// refilled from the source as needed.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Source`] if the source failed; bytes the source delivered
    /// before failing are returned first. [`DecodeError::Poisoned`] on any
    /// read after that.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, DecodeError<S::Error>> {
        if self.decoder.state == DecoderState::Poisoned {
            return Err(DecodeError::Poisoned);
        }

        let mut written = 0;
        while written < dst.len() {
            if let Some(byte) = self.escape.pop_pending(self.end.is_some()) {
                dst[written] = byte;
                written += 1;
                continue;
            }
            if self.end.is_some() {
                break;
            }

            let window = &mut self.decoder.window;
            let Some(input) = window.next_byte() else {
                window.refill(&mut self.decoder.source);
                if window.is_empty() {
                    self.reach_end(End::Exhausted);
                }
                continue;
            };
            if input == b'&' {
                self.reach_end(End::Delimiter);
            } else if let Some(byte) = self.escape.feed(input) {
                dst[written] = byte;
                written += 1;
            }
        }

        self.settle(written)
    }

    fn reach_end(&mut self, end: End) {
        self.end = Some(end);
        if self.decoder.state == DecoderState::ValueOpen {
            self.decoder.state = DecoderState::ValueEnded;
        }
    }

    /// Marks the decoder idle once the value is fully drained, surfacing a
    /// pending source failure after every byte delivered before it.
    fn settle(&mut self, written: usize) -> Result<usize, DecodeError<S::Error>> {
        if self.end.is_none() || self.escape.has_pending() {
            return Ok(written);
        }
        if self.end == Some(End::Exhausted) && self.decoder.window.has_failure() {
            if written > 0 {
                return Ok(written);
            }
            if let Some(err) = self.decoder.window.take_failure() {
                debug!("source failed inside a value, poisoning decoder");
                return Err(self.decoder.poison(DecodeError::Source(err)));
            }
        }
        if self.decoder.state == DecoderState::ValueEnded {
            self.decoder.state = DecoderState::Idle;
        }
        Ok(written)
    }

    /// Reads the rest of the value, appending it to `out`. Returns the number
    /// of bytes appended.
    ///
    /// # Errors
    ///
    /// See [`Value::read`]. Bytes read before an error stay in `out`.
    pub fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize, DecodeError<S::Error>> {
        let mut chunk = [0u8; 256];
        let start = out.len();
        loop {
            match self.read(&mut chunk)? {
                0 => return Ok(out.len() - start),
                n => out.extend_from_slice(&chunk[..n]),
            }
        }
    }

    /// Reads the rest of the value into a new byte string.
    ///
    /// # Errors
    ///
    /// See [`Value::read`].
    pub fn to_bstring(&mut self) -> Result<BString, DecodeError<S::Error>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out)?;
        Ok(BString::from(out))
    }

    /// Discards the rest of the value.
    ///
    /// # Errors
    ///
    /// See [`Value::read`].
    pub fn skip(&mut self) -> Result<(), DecodeError<S::Error>> {
        let mut chunk = [0u8; 64];
        while self.read(&mut chunk)? > 0 {}
        Ok(())
    }
}

impl<S: Source> fmt::Debug for Value<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("escape", &self.escape)
            .field("end", &self.end)
            .field("drained", &self.is_drained())
            .finish_non_exhaustive()
    }
}

/// Values over an I/O source are readers themselves; source errors come back
/// unchanged.
#[cfg(feature = "std")]
impl<S> std::io::Read for Value<'_, S>
where
    S: Source<Error = std::io::Error>,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Value::read(self, buf).map_err(Into::into)
    }
}
