//! Recursive-descent decoding of bencode into [`Value`] and [`ValueRef`]
//! trees.

mod options;
mod read;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::BufRead;

use bytes::Bytes;
use tracing::{debug, trace};

pub use options::{DecodeOptions, EofBehavior, DEFAULT_MAX_DEPTH};
pub use read::{BorrowRead, BytesRead, IoRead, IterRead, Read, SliceRead};

use crate::error::BencodeError;
use crate::value::{Value, ValueRef};

/// Decodes a buffer holding exactly one bencode value, copying every byte
/// string out of the input.
///
/// # Errors
///
/// Fails on malformed input, on an empty buffer, and on bytes left over
/// after the value.
///
/// # Examples
///
/// ```
/// use rbencode::{decode, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
/// assert_eq!(decode(b"4:spam").unwrap().as_str(), Some("spam"));
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    decode_with(data, DecodeOptions::default())
}

pub fn decode_with(data: &[u8], options: DecodeOptions) -> Result<Value, BencodeError> {
    let mut decoder = Decoder::with_options(SliceRead::new(data), options);
    let value = decoder.decode_value()?;
    decoder.finish()?;
    Ok(value)
}

/// Decodes a buffer in view mode: byte strings in the result are slices of
/// `data`, not copies.
///
/// The result borrows `data`, so the buffer cannot be modified or dropped
/// while the view is alive.
///
/// ```
/// use rbencode::decode_view;
///
/// let data = b"d3:cow3:mooe";
/// let view = decode_view(data).unwrap();
/// let moo = view.get(b"cow").and_then(|v| v.as_bytes()).unwrap();
/// assert!(data.as_ptr_range().contains(&moo.as_ptr()));
/// ```
pub fn decode_view(data: &[u8]) -> Result<ValueRef<'_>, BencodeError> {
    decode_view_with(data, DecodeOptions::default())
}

pub fn decode_view_with(
    data: &[u8],
    options: DecodeOptions,
) -> Result<ValueRef<'_>, BencodeError> {
    let mut decoder = Decoder::with_options(SliceRead::new(data), options);
    let value = decoder.decode_value_view()?;
    decoder.finish()?;
    Ok(value)
}

/// Decodes a shared buffer. Byte strings in the result are reference-counted
/// slices of `data`, so nothing is copied and the result has no borrow
/// lifetime.
pub fn decode_bytes(data: &Bytes) -> Result<Value, BencodeError> {
    decode_bytes_with(data, DecodeOptions::default())
}

pub fn decode_bytes_with(data: &Bytes, options: DecodeOptions) -> Result<Value, BencodeError> {
    let mut decoder = Decoder::with_options(BytesRead::new(data.clone()), options);
    let value = decoder.decode_value()?;
    decoder.finish()?;
    Ok(value)
}

/// Decodes one value from the front of `data` and returns it together with
/// the number of bytes it occupied. Whatever follows is left untouched.
///
/// ```
/// use rbencode::{decode_prefix, Value};
///
/// let (value, used) = decode_prefix(b"i1ei2e").unwrap();
/// assert_eq!(value, Value::Integer(1));
/// assert_eq!(used, 3);
/// ```
pub fn decode_prefix(data: &[u8]) -> Result<(Value, usize), BencodeError> {
    let mut decoder = Decoder::from_slice(data);
    let value = decoder.decode_value()?;
    Ok((value, decoder.position()))
}

/// Decodes one value from a forward-only byte iterator.
///
/// The decoder never reads past the last byte of the value, so passing
/// `&mut iter` leaves the iterator positioned at the next value.
///
/// ```
/// use rbencode::{decode_iter, Value};
///
/// let mut bytes = b"i1e3:abc".iter().copied();
/// assert_eq!(decode_iter(&mut bytes).unwrap(), Value::Integer(1));
/// assert_eq!(decode_iter(&mut bytes).unwrap(), Value::from("abc"));
/// ```
pub fn decode_iter<I>(iter: I) -> Result<Value, BencodeError>
where
    I: IntoIterator<Item = u8>,
{
    Decoder::from_byte_iter(iter.into_iter()).decode_value()
}

/// Result of [`decode_reader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub value: Value,
    /// Whether the source was empty after the value. Always `false` with
    /// [`EofBehavior::NoCheck`], which never looks past the value.
    pub exhausted: bool,
}

/// Decodes one value from a sequential source.
///
/// Bytes are consumed only up to the end of the value; anything after it
/// stays in `reader`. Byte strings are always copied.
///
/// ```
/// use rbencode::{decode_reader, EofBehavior};
///
/// let mut src: &[u8] = b"l4:spam4:eggse";
/// let decoded = decode_reader(&mut src, EofBehavior::Check).unwrap();
/// assert_eq!(decoded.value.as_list().map(|l| l.len()), Some(2));
/// assert!(decoded.exhausted);
/// ```
pub fn decode_reader<R: BufRead>(reader: &mut R, eof: EofBehavior) -> Result<Decoded, BencodeError> {
    let mut decoder = Decoder::from_reader(reader);
    let value = decoder.decode_value()?;
    let exhausted = match eof {
        EofBehavior::Check => decoder.is_exhausted()?,
        EofBehavior::NoCheck => false,
    };
    Ok(Decoded { value, exhausted })
}

/// A value tree the parser can assemble, paired with the way it obtains byte
/// strings from a reader.
trait Build<R>: Sized {
    type Str: Ord + AsRef<[u8]>;

    fn read_string(reader: &mut R, len: usize) -> Result<Self::Str, BencodeError>;
    fn integer(i: i64) -> Self;
    fn string(s: Self::Str) -> Self;
    fn list(items: Vec<Self>) -> Self;
    fn dict(entries: BTreeMap<Self::Str, Self>) -> Self;
}

impl<R: Read> Build<R> for Value {
    type Str = Bytes;

    fn read_string(reader: &mut R, len: usize) -> Result<Bytes, BencodeError> {
        reader.read_bytes(len)
    }

    fn integer(i: i64) -> Self {
        Value::Integer(i)
    }

    fn string(s: Bytes) -> Self {
        Value::Bytes(s)
    }

    fn list(items: Vec<Self>) -> Self {
        Value::List(items)
    }

    fn dict(entries: BTreeMap<Bytes, Self>) -> Self {
        Value::Dict(entries)
    }
}

impl<'de, R: BorrowRead<'de>> Build<R> for ValueRef<'de> {
    type Str = &'de [u8];

    fn read_string(reader: &mut R, len: usize) -> Result<&'de [u8], BencodeError> {
        reader.read_borrowed(len)
    }

    fn integer(i: i64) -> Self {
        ValueRef::Integer(i)
    }

    fn string(s: &'de [u8]) -> Self {
        ValueRef::Bytes(s)
    }

    fn list(items: Vec<Self>) -> Self {
        ValueRef::List(items)
    }

    fn dict(entries: BTreeMap<&'de [u8], Self>) -> Self {
        ValueRef::Dict(entries)
    }
}

/// A reusable decoder over any [`Read`] strategy.
///
/// Unlike the one-shot functions, a `Decoder` can read several top-level
/// values from one source in sequence. [`decode_next`](Decoder::decode_next)
/// returns `Ok(None)` when the source ends cleanly between values, which is
/// distinct from an input that ends inside one.
///
/// ```
/// use rbencode::{Decoder, Value};
///
/// let mut decoder = Decoder::from_slice(b"i1e4:spam");
/// assert_eq!(decoder.decode_next().unwrap(), Some(Value::Integer(1)));
/// assert_eq!(decoder.decode_next().unwrap(), Some(Value::from("spam")));
/// assert_eq!(decoder.decode_next().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    options: DecodeOptions,
    failed: bool,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self {
            reader,
            options,
            failed: false,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Number of input bytes consumed so far.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Returns `true` if no input remains. May read ahead on sequential
    /// sources, but never consumes anything.
    pub fn is_exhausted(&mut self) -> Result<bool, BencodeError> {
        Ok(self.reader.peek()?.is_none())
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Decodes the next value, or returns `Ok(None)` if the input is
    /// exhausted at a value boundary.
    pub fn decode_next(&mut self) -> Result<Option<Value>, BencodeError> {
        if self.is_exhausted()? {
            return Ok(None);
        }
        self.decode_value().map(Some)
    }

    /// Decodes the next value. Running out of input before the first byte
    /// is an error here.
    pub fn decode_value(&mut self) -> Result<Value, BencodeError> {
        self.run::<Value>()
    }

    /// Checks that nothing follows the decoded value, unless the options
    /// allow trailing data.
    pub fn finish(&mut self) -> Result<(), BencodeError> {
        if !self.options.allow_trailing && !self.is_exhausted()? {
            debug!(position = self.reader.position(), "trailing data after bencode value");
            return Err(BencodeError::TrailingData);
        }
        Ok(())
    }

    fn run<N: Build<R>>(&mut self) -> Result<N, BencodeError> {
        let start = self.reader.position();
        match self.parse_value::<N>(0) {
            Ok(value) => {
                trace!(
                    consumed = self.reader.position() - start,
                    "decoded bencode value"
                );
                Ok(value)
            }
            Err(e) => {
                self.failed = true;
                debug!(position = self.reader.position(), error = %e, "bencode decode failed");
                Err(e)
            }
        }
    }

    fn parse_value<N: Build<R>>(&mut self, depth: usize) -> Result<N, BencodeError> {
        let position = self.reader.position();
        match self.reader.peek()? {
            None => Err(BencodeError::UnexpectedEndOfInput),
            Some(b'i') => {
                self.reader.discard();
                self.parse_integer().map(N::integer)
            }
            Some(b'l') => self.parse_list(depth),
            Some(b'd') => self.parse_dict(depth),
            Some(b'0'..=b'9') => self.parse_string::<N>().map(N::string),
            Some(c) => Err(BencodeError::unexpected("value", c, position)),
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, BencodeError> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            debug!(
                max_depth = self.options.max_depth,
                position = self.reader.position(),
                "bencode nesting limit exceeded"
            );
            return Err(BencodeError::NestingTooDeep);
        }
        Ok(depth)
    }

    /// Parses the body of an integer; the leading `i` is already consumed.
    fn parse_integer(&mut self) -> Result<i64, BencodeError> {
        let negative = self.reader.peek()? == Some(b'-');
        if negative {
            self.reader.discard();
        }

        let position = self.reader.position();
        let first = match self.reader.peek()? {
            None => return Err(BencodeError::UnexpectedEndOfInput),
            Some(b'0') if negative => {
                return Err(BencodeError::unexpected("nonzero digit", b'0', position))
            }
            Some(c @ b'0'..=b'9') => c - b'0',
            Some(c) => return Err(BencodeError::unexpected("digit", c, position)),
        };
        self.reader.discard();

        if first == 0 {
            self.expect(b'e', "'e'")?;
            return Ok(0);
        }

        let mut value = i64::from(first);
        if negative {
            value = -value;
        }
        loop {
            let position = self.reader.position();
            match self.reader.peek()? {
                None => return Err(BencodeError::UnexpectedEndOfInput),
                Some(b'e') => {
                    self.reader.discard();
                    return Ok(value);
                }
                Some(c @ b'0'..=b'9') => {
                    let digit = i64::from(c - b'0');
                    value = value
                        .checked_mul(10)
                        .and_then(|v| {
                            if negative {
                                v.checked_sub(digit)
                            } else {
                                v.checked_add(digit)
                            }
                        })
                        .ok_or(BencodeError::IntegerOverflow)?;
                    self.reader.discard();
                }
                Some(c) => return Err(BencodeError::unexpected("digit or 'e'", c, position)),
            }
        }
    }

    fn parse_length(&mut self) -> Result<usize, BencodeError> {
        let position = self.reader.position();
        let first = match self.reader.peek()? {
            None => return Err(BencodeError::UnexpectedEndOfInput),
            Some(c @ b'0'..=b'9') => c - b'0',
            Some(c) => return Err(BencodeError::unexpected("string length", c, position)),
        };
        self.reader.discard();

        if first == 0 && self.options.canonical_lengths {
            self.expect(b':', "':'")?;
            return Ok(0);
        }

        let mut len = usize::from(first);
        loop {
            let position = self.reader.position();
            match self.reader.peek()? {
                None => return Err(BencodeError::UnexpectedEndOfInput),
                Some(b':') => {
                    self.reader.discard();
                    return Ok(len);
                }
                Some(c @ b'0'..=b'9') => {
                    len = len
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(c - b'0')))
                        .ok_or(BencodeError::IntegerOverflow)?;
                    self.reader.discard();
                }
                Some(c) => return Err(BencodeError::unexpected("digit or ':'", c, position)),
            }
        }
    }

    fn parse_string<N: Build<R>>(&mut self) -> Result<N::Str, BencodeError> {
        let len = self.parse_length()?;
        if let Some(max) = self.options.max_string_len {
            if len > max {
                debug!(len, max, "bencode string length limit exceeded");
                return Err(BencodeError::StringTooLong { len, max });
            }
        }
        N::read_string(&mut self.reader, len)
    }

    fn parse_list<N: Build<R>>(&mut self, depth: usize) -> Result<N, BencodeError> {
        let depth = self.enter(depth)?;
        self.reader.discard();

        let mut items = Vec::new();
        loop {
            match self.reader.peek()? {
                None => return Err(BencodeError::UnexpectedEndOfInput),
                Some(b'e') => {
                    self.reader.discard();
                    return Ok(N::list(items));
                }
                Some(_) => items.push(self.parse_value::<N>(depth)?),
            }
        }
    }

    fn parse_dict<N: Build<R>>(&mut self, depth: usize) -> Result<N, BencodeError> {
        let depth = self.enter(depth)?;
        self.reader.discard();

        let mut entries = BTreeMap::new();
        loop {
            let position = self.reader.position();
            match self.reader.peek()? {
                None => return Err(BencodeError::UnexpectedEndOfInput),
                Some(b'e') => {
                    self.reader.discard();
                    return Ok(N::dict(entries));
                }
                Some(b'0'..=b'9') => {
                    let key = self.parse_string::<N>()?;
                    let value = self.parse_value::<N>(depth)?;
                    match entries.entry(key) {
                        Entry::Occupied(e) => {
                            return Err(BencodeError::DuplicateDictKey(Bytes::copy_from_slice(
                                e.key().as_ref(),
                            )))
                        }
                        Entry::Vacant(e) => {
                            e.insert(value);
                        }
                    }
                }
                Some(c) => return Err(BencodeError::unexpected("string key", c, position)),
            }
        }
    }

    fn expect(&mut self, expected: u8, name: &'static str) -> Result<(), BencodeError> {
        let position = self.reader.position();
        match self.reader.peek()? {
            None => Err(BencodeError::UnexpectedEndOfInput),
            Some(c) if c == expected => {
                self.reader.discard();
                Ok(())
            }
            Some(c) => Err(BencodeError::unexpected(name, c, position)),
        }
    }
}

impl<'de> Decoder<SliceRead<'de>> {
    pub fn from_slice(data: &'de [u8]) -> Self {
        Self::new(SliceRead::new(data))
    }

    /// The input that has not been consumed yet.
    pub fn remaining(&self) -> &'de [u8] {
        self.reader.remaining()
    }

    /// Decodes the next value in view mode, or returns `Ok(None)` at the end
    /// of input.
    pub fn decode_next_view(&mut self) -> Result<Option<ValueRef<'de>>, BencodeError> {
        if self.is_exhausted()? {
            return Ok(None);
        }
        self.decode_value_view().map(Some)
    }

    pub fn decode_value_view(&mut self) -> Result<ValueRef<'de>, BencodeError> {
        self.run::<ValueRef<'de>>()
    }
}

impl Decoder<BytesRead> {
    pub fn from_bytes(data: Bytes) -> Self {
        Self::new(BytesRead::new(data))
    }
}

impl<B: BufRead> Decoder<IoRead<B>> {
    pub fn from_reader(reader: B) -> Self {
        Self::new(IoRead::new(reader))
    }
}

impl<I: Iterator<Item = u8>> Decoder<IterRead<I>> {
    pub fn from_byte_iter(iter: I) -> Self {
        Self::new(IterRead::new(iter))
    }
}

/// Yields consecutive top-level values until the input ends. Iteration stops
/// after the first error.
impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<Value, BencodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.decode_next();
        if next.is_err() {
            self.failed = true;
        }
        next.transpose()
    }
}
