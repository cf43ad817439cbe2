use alloc::vec::Vec;
use core::fmt::Debug;

use bstr::BString;

use crate::{DecodeError, Decoder, DecoderOptions, Fetch, Source, Value};

/// Decoded pairs, or the error that stopped decoding.
pub type Outcome<E> = Result<Vec<(BString, BString)>, DecodeError<E>>;

pub fn small_window(capacity: usize) -> DecoderOptions {
    DecoderOptions {
        window_capacity: capacity,
    }
}

/// Drains `value` using reads of at most `read_size` bytes.
pub fn read_in_steps<S: Source>(
    value: &mut Value<'_, S>,
    read_size: usize,
) -> Result<Vec<u8>, DecodeError<S::Error>> {
    let mut out = Vec::new();
    let mut buf = alloc::vec![0u8; read_size];
    loop {
        match value.read(&mut buf)? {
            0 => return Ok(out),
            n => out.extend_from_slice(&buf[..n]),
        }
    }
}

/// Like [`Decoder::collect_pairs`], but drains every value in steps of
/// `read_size` bytes.
pub fn collect_in_steps<S: Source>(decoder: &mut Decoder<S>, read_size: usize) -> Outcome<S::Error> {
    let mut pairs = Vec::new();
    while let Some(mut pair) = decoder.next_pair()? {
        let value = read_in_steps(&mut pair.value, read_size)?;
        pairs.push((pair.key, BString::from(value)));
    }
    Ok(pairs)
}

#[track_caller]
pub fn require_pair<S: Source>(decoder: &mut Decoder<S>, key: &str, value: &[u8])
where
    S::Error: Debug,
{
    let mut pair = decoder
        .next_pair()
        .expect("next_pair failed")
        .expect("expected a pair");
    assert_eq!(pair.key, key, "key does not match");
    let decoded = pair.value.to_bstring().expect("reading the value failed");
    assert_eq!(decoded, value, "value does not match");
    assert!(pair.value.is_drained());
}

#[track_caller]
pub fn require_end<S: Source>(decoder: &mut Decoder<S>)
where
    S::Error: Debug,
{
    assert!(
        decoder.next_pair().expect("next_pair failed").is_none(),
        "expected end of stream"
    );
}

pub fn owned(pairs: &[(&str, &[u8])]) -> Vec<(BString, BString)> {
    pairs
        .iter()
        .map(|&(key, value)| (BString::from(key), BString::from(value)))
        .collect()
}

/// Encodes pairs the way a browser submits a form: alphanumerics verbatim,
/// space as `+`, everything else as `%XX` with alternating hex case.
pub fn form_encode(pairs: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    const UPPER: &[u8; 16] = b"0123456789ABCDEF";
    const LOWER: &[u8; 16] = b"0123456789abcdef";

    let mut out = Vec::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push(b'&');
        }
        out.extend_from_slice(key);
        out.push(b'=');
        for (j, &byte) in value.iter().enumerate() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => out.push(byte),
                b' ' => out.push(b'+'),
                _ => {
                    let digits = if j % 2 == 0 { UPPER } else { LOWER };
                    out.push(b'%');
                    out.push(digits[usize::from(byte >> 4)]);
                    out.push(digits[usize::from(byte & 0xf)]);
                }
            }
        }
    }
    out
}

/// Delivers `data` in fetches of at most `step` bytes, then fails.
pub struct FailingSource<'a> {
    data: &'a [u8],
    step: usize,
    /// Report the failure together with the final bytes.
    together: bool,
    pub fetches: usize,
}

impl<'a> FailingSource<'a> {
    pub fn new(data: &'a [u8], step: usize) -> Self {
        Self {
            data,
            step,
            together: false,
            fetches: 0,
        }
    }

    pub fn together(mut self) -> Self {
        self.together = true;
        self
    }
}

impl Source for FailingSource<'_> {
    type Error = &'static str;

    fn fetch(&mut self, buf: &mut [u8]) -> Fetch<Self::Error> {
        self.fetches += 1;
        if self.data.is_empty() {
            return Fetch::failed(0, "connection reset");
        }
        let len = self.data.len().min(buf.len()).min(self.step);
        let (head, tail) = self.data.split_at(len);
        buf[..len].copy_from_slice(head);
        self.data = tail;
        if self.data.is_empty() && self.together {
            Fetch::failed(len, "connection reset")
        } else {
            Fetch::more(len)
        }
    }
}
