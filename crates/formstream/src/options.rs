/// Default size of the decoder's window, in bytes.
pub const DEFAULT_WINDOW_CAPACITY: usize = 1024;

/// Configuration options for the form decoder.
///
/// # Examples
///
/// ```rust
/// use formstream::{Decoder, DecoderOptions};
///
/// let options = DecoderOptions {
///     window_capacity: 64,
/// };
/// let mut decoder = Decoder::with_options(&b"a=1"[..], options);
/// assert_eq!(decoder.window_capacity(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Size of the fixed sliding window over the source, in bytes.
    ///
    /// This is the only memory the decoder holds on to. It also bounds key
    /// length: a key and its delimiter must fit in the window together, so the
    /// longest accepted key is `window_capacity - 1` bytes.
    ///
    /// Must be at least 1.
    ///
    /// # Default
    ///
    /// [`DEFAULT_WINDOW_CAPACITY`] (1024)
    pub window_capacity: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}
