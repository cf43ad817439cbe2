use thiserror::Error;

/// Errors surfaced by [`Decoder::next_pair`](crate::Decoder::next_pair) and
/// [`Value::read`](crate::Value::read).
///
/// End-of-stream is not an error: it is reported as `Ok(None)` by
/// `next_pair`. Malformed percent-escapes are not errors either; they pass
/// through as the literal bytes that were read.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError<E> {
    /// The window filled up before a `=` or `&` delimiter was found.
    ///
    /// The decoder is poisoned afterwards.
    #[error("key exceeds the window capacity of {capacity} bytes")]
    KeyTooLong {
        /// Capacity of the window that overflowed.
        capacity: usize,
    },
    /// The source failed while fetching. The error is handed over verbatim and
    /// the decoder is poisoned afterwards.
    #[error("source error: {0}")]
    Source(#[source] E),
    /// A new pair was requested before the previous value was drained.
    #[error("the previous value was not drained before requesting the next pair")]
    UndrainedValue,
    /// The decoder was used after a `KeyTooLong` or `Source` error.
    #[error("decoder is unusable after a previous failure")]
    Poisoned,
}

#[cfg(feature = "std")]
impl From<DecodeError<std::io::Error>> for std::io::Error {
    fn from(err: DecodeError<std::io::Error>) -> Self {
        match err {
            DecodeError::Source(err) => err,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
