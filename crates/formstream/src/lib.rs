//! Streaming decoder for `application/x-www-form-urlencoded` bodies.
//!
//! The decoder reads `key=value&key=value&...` from a [`Source`] through a
//! single fixed-capacity window, so memory use does not grow with the payload.
//! Pairs are handed out one at a time; each value is decoded (`+` to space,
//! `%XX` to a byte) only as the caller reads it.
//!
//! Decoding is lenient: malformed or truncated escapes such as `%`, `%a` or
//! `%zz` pass through as literal text instead of failing.
//!
//! ```rust
//! use formstream::{ChunkedSource, Decoder, DecoderOptions};
//!
//! // The escape straddles two fetches.
//! let source = ChunkedSource::new([&b"greeting=hi%2"[..], b"1&empty&"]);
//! let mut decoder = Decoder::with_options(source, DecoderOptions { window_capacity: 16 });
//!
//! let pairs = decoder.collect_pairs().unwrap();
//! assert_eq!(pairs.len(), 2);
//! assert_eq!(pairs[0].0, "greeting");
//! assert_eq!(pairs[0].1, "hi!");
//! assert_eq!(pairs[1].0, "empty");
//! assert_eq!(pairs[1].1, "");
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod decoder;
mod error;
mod escape;
mod options;
mod source;
mod value;
mod window;

#[doc(hidden)]
pub mod chunk_utils;

#[cfg(test)]
mod tests;

pub use decoder::{Decoder, Pair};
pub use error::DecodeError;
pub use options::{DEFAULT_WINDOW_CAPACITY, DecoderOptions};
#[cfg(feature = "std")]
pub use source::ReadSource;
pub use source::{ChunkedSource, Fetch, Signal, Source};
pub use value::Value;
