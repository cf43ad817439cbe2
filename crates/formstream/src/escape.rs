//! Lenient, byte-at-a-time decoding of `+` and `%XX` escapes.
//!
//! The [`EscapeDecoder`] is fed one raw value byte at a time. Plain bytes (and
//! `+`, which becomes a space) are returned immediately. A `%` starts an
//! escape whose bytes are held in a three-byte memory until the escape is
//! complete:
//!
//! - `%` followed by two hex digits decodes to a single byte and the memory is
//!   discarded.
//! - `%` followed by anything else is *not* an error: the memory is flushed as
//!   literal bytes, so `%r` stays `%r` and `%ar` stays `%ar`.
//!
//! Memory that is still pending when the value ends (a trailing `%` or `%a`)
//! is flushed literally as well; the caller forces that with
//! [`EscapeDecoder::pop_pending`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    Verbatim,
    /// Last byte was `%`.
    EscapeSeen,
    /// Last two bytes were `%` and one hex digit.
    EscapeDigit1,
}

#[derive(Debug)]
pub(crate) struct EscapeDecoder {
    state: EscapeState,
    memory: [u8; 3],
    len: u8,
    head: u8,
    flush: bool,
}

impl EscapeDecoder {
    pub(crate) fn new() -> Self {
        Self {
            state: EscapeState::Verbatim,
            memory: [0; 3],
            len: 0,
            head: 0,
            flush: false,
        }
    }

    #[inline]
    fn hex_val(byte: u8) -> Option<u8> {
        match byte {
            b'0'..=b'9' => Some(byte - b'0'),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            b'A'..=b'F' => Some(byte - b'A' + 10),
            _ => None,
        }
    }

    #[inline]
    fn remember(&mut self, byte: u8) {
        self.memory[usize::from(self.len)] = byte;
        self.len += 1;
    }

    /// Whether escape memory is waiting to be flushed or completed.
    #[inline]
    pub(crate) fn has_pending(&self) -> bool {
        self.head < self.len
    }

    /// Pops the next literal byte from escape memory.
    ///
    /// Memory is only released once the escape has been resolved as literal
    /// text, or when `force` is set because the value has ended.
    #[inline]
    pub(crate) fn pop_pending(&mut self, force: bool) -> Option<u8> {
        if !(self.flush || force) || !self.has_pending() {
            return None;
        }
        let byte = self.memory[usize::from(self.head)];
        self.head += 1;
        if self.head == self.len {
            self.len = 0;
            self.head = 0;
            self.flush = false;
        }
        Some(byte)
    }

    /// Feeds one raw value byte, returning a decoded byte if one is ready.
    ///
    /// Must not be called while flushed memory is still pending.
    pub(crate) fn feed(&mut self, byte: u8) -> Option<u8> {
        debug_assert!(!(self.flush && self.has_pending()));
        match self.state {
            EscapeState::Verbatim => match byte {
                b'%' => {
                    self.len = 0;
                    self.head = 0;
                    self.flush = false;
                    self.remember(b'%');
                    self.state = EscapeState::EscapeSeen;
                    None
                }
                b'+' => Some(b' '),
                _ => Some(byte),
            },
            EscapeState::EscapeSeen => {
                self.remember(byte);
                if Self::hex_val(byte).is_some() {
                    self.state = EscapeState::EscapeDigit1;
                } else {
                    self.state = EscapeState::Verbatim;
                    self.flush = true;
                }
                None
            }
            EscapeState::EscapeDigit1 => {
                self.state = EscapeState::Verbatim;
                match (Self::hex_val(self.memory[1]), Self::hex_val(byte)) {
                    (Some(high), Some(low)) => {
                        self.len = 0;
                        self.head = 0;
                        Some((high << 4) | low)
                    }
                    _ => {
                        self.remember(byte);
                        self.flush = true;
                        None
                    }
                }
            }
        }
    }
}
