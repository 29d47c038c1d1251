/// Default limit on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hardening limits applied while decoding.
///
/// Bencode is self-describing, so an adversarial input can nest containers
/// arbitrarily deep or announce an enormous string. These limits reject such
/// input before it exhausts the stack or memory.
///
/// # Examples
///
/// ```
/// use rbencode::{decode_with, BencodeError, DecodeOptions};
///
/// let options = DecodeOptions::default().max_depth(1).max_string_len(4);
///
/// assert!(decode_with(b"l4:spame", options).is_ok());
/// assert!(matches!(
///     decode_with(b"llee", options),
///     Err(BencodeError::NestingTooDeep)
/// ));
/// assert!(matches!(
///     decode_with(b"5:hello", options),
///     Err(BencodeError::StringTooLong { len: 5, max: 4 })
/// ));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of nested lists and dictionaries. A top-level list is
    /// at depth 1; zero rejects every container.
    pub max_depth: usize,
    /// Maximum length of a single byte string, or `None` for no limit.
    pub max_string_len: Option<usize>,
    /// Accept bytes after the first complete value in whole-buffer decodes.
    pub allow_trailing: bool,
    /// Reject string length prefixes with leading zeros, such as `03:abc`.
    pub canonical_lengths: bool,
}

impl DecodeOptions {
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = Some(len);
        self
    }

    pub fn allow_trailing(mut self, allow: bool) -> Self {
        self.allow_trailing = allow;
        self
    }

    pub fn canonical_lengths(mut self, canonical: bool) -> Self {
        self.canonical_lengths = canonical;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_len: None,
            allow_trailing: false,
            canonical_lengths: false,
        }
    }
}

/// What [`decode_reader`](crate::decode_reader) does after a value has been
/// read from a sequential source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofBehavior {
    /// Look ahead once and report whether the source is exhausted.
    #[default]
    Check,
    /// Stop immediately after the value. Use this for sources where an
    /// extra read would block, such as an open socket.
    NoCheck,
}
