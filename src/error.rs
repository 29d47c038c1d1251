use bytes::Bytes;
use thiserror::Error;

/// Errors produced while decoding or encoding bencode.
///
/// Any error aborts the whole call that produced it; there are no partial
/// results. The decoder and encoder keep no state across calls, so it is
/// always safe to retry with corrected input.
#[derive(Debug, Error)]
pub enum BencodeError {
    /// The input ended before the current value was complete.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// A specific byte was required and a different one was found.
    #[error("unexpected token at byte {position}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        expected: &'static str,
        found: char,
        position: usize,
    },

    /// A dictionary contained the same key twice.
    #[error("duplicate dictionary key: {}", String::from_utf8_lossy(.0))]
    DuplicateDictKey(Bytes),

    /// An integer or string length does not fit the target width.
    #[error("integer overflow")]
    IntegerOverflow,

    /// A type-erased value could not be mapped to a bencode kind.
    #[error("invalid type for bencode encoding")]
    InvalidType,

    /// Extra bytes followed a complete top-level value.
    #[error("trailing data after value")]
    TrailingData,

    /// Nesting exceeded [`DecodeOptions::max_depth`](crate::DecodeOptions).
    #[error("nesting too deep")]
    NestingTooDeep,

    /// A string length prefix exceeded [`DecodeOptions::max_string_len`](crate::DecodeOptions).
    #[error("string of {len} bytes exceeds limit of {max}")]
    StringTooLong { len: usize, max: usize },

    /// The underlying reader or writer failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BencodeError {
    pub(crate) fn unexpected(expected: &'static str, found: u8, position: usize) -> Self {
        BencodeError::UnexpectedToken {
            expected,
            found: found as char,
            position,
        }
    }

    /// Returns `true` if the error was caused by running out of input,
    /// which separates a truncated value from a malformed one.
    pub fn is_eof(&self) -> bool {
        matches!(self, BencodeError::UnexpectedEndOfInput)
    }
}
