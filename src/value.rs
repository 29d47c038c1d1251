use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// The four kinds of bencode value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Bytes,
    List,
    Dict,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Integer => "integer",
            Kind::Bytes => "byte string",
            Kind::List => "list",
            Kind::Dict => "dictionary",
        };
        f.write_str(name)
    }
}

/// An owned bencode value.
///
/// Byte strings are [`Bytes`], so a `Value` decoded with
/// [`decode_bytes`](crate::decode_bytes) shares the input buffer instead of
/// copying it, while one decoded with [`decode`](crate::decode) owns a copy.
/// Dictionaries are kept in a [`BTreeMap`], so iteration (and encoding)
/// always visits keys in ascending byte order regardless of input order.
///
/// # Examples
///
/// ```
/// use rbencode::Value;
///
/// let int: Value = 42i64.into();
/// let string: Value = "hello".into();
/// let list = Value::List(vec![int.clone(), string.clone()]);
///
/// assert_eq!(int.as_integer(), Some(42));
/// assert_eq!(string.as_str(), Some("hello"));
/// assert_eq!(list.as_list().map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// A byte string (may or may not be valid UTF-8).
    Bytes(Bytes),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary with unique byte string keys.
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from a UTF-8 string.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Integer(_) => Kind::Integer,
            Value::Bytes(_) => Kind::Bytes,
            Value::List(_) => Kind::List,
            Value::Dict(_) => Kind::Dict,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a byte string, if it is one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a UTF-8 string.
    ///
    /// Returns `None` if the value is not a byte string or if the bytes are
    /// not valid UTF-8.
    ///
    /// ```
    /// use rbencode::Value;
    ///
    /// assert_eq!(Value::string("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::Integer(42).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value and returns the list, if it is one.
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary, if it is one.
    pub fn into_dict(self) -> Option<BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// ```
    /// use rbencode::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap();
    /// assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
    /// assert_eq!(value.get(b"missing"), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Value::Integer(i64::from(i))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(d: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(d)
    }
}

impl<'a> From<&ValueRef<'a>> for Value {
    fn from(v: &ValueRef<'a>) -> Self {
        v.to_owned_value()
    }
}

/// A bencode value whose byte strings borrow from the decoded buffer.
///
/// Produced by [`decode_view`](crate::decode_view). Every string in the
/// tree is a slice of the caller's buffer, so nothing is copied, and the
/// lifetime `'a` keeps the buffer alive and immutable for as long as the
/// view exists. Once the view is dropped the buffer may be modified again;
/// decoding it afresh observes the new bytes.
///
/// # Examples
///
/// ```
/// use rbencode::{decode_view, ValueRef};
///
/// let buf = b"l4:spami7ee".to_vec();
/// let view = decode_view(&buf).unwrap();
///
/// let spam = view.as_list().unwrap()[0].as_bytes().unwrap();
/// assert_eq!(spam, b"spam");
/// // The slice points into `buf` itself.
/// assert_eq!(spam.as_ptr(), buf[3..].as_ptr());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueRef<'a> {
    Integer(i64),
    Bytes(&'a [u8]),
    List(Vec<ValueRef<'a>>),
    Dict(BTreeMap<&'a [u8], ValueRef<'a>>),
}

impl<'a> ValueRef<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            ValueRef::Integer(_) => Kind::Integer,
            ValueRef::Bytes(_) => Kind::Bytes,
            ValueRef::List(_) => Kind::List,
            ValueRef::Dict(_) => Kind::Dict,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ValueRef::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the borrowed byte string. The returned slice lives as long
    /// as the input buffer, not as long as `self`.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            ValueRef::Bytes(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&Vec<ValueRef<'a>>> {
        match self {
            ValueRef::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<&'a [u8], ValueRef<'a>>> {
        match self {
            ValueRef::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<ValueRef<'a>>> {
        match self {
            ValueRef::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn into_dict(self) -> Option<BTreeMap<&'a [u8], ValueRef<'a>>> {
        match self {
            ValueRef::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&ValueRef<'a>> {
        self.as_dict()?.get(key)
    }

    /// Copies the view into an owned [`Value`] that no longer borrows the
    /// input buffer.
    pub fn to_owned_value(&self) -> Value {
        match self {
            ValueRef::Integer(i) => Value::Integer(*i),
            ValueRef::Bytes(b) => Value::Bytes(Bytes::copy_from_slice(b)),
            ValueRef::List(l) => Value::List(l.iter().map(ValueRef::to_owned_value).collect()),
            ValueRef::Dict(d) => Value::Dict(
                d.iter()
                    .map(|(k, v)| (Bytes::copy_from_slice(k), v.to_owned_value()))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for ValueRef<'_> {
    fn from(i: i64) -> Self {
        ValueRef::Integer(i)
    }
}

impl<'a> From<&'a [u8]> for ValueRef<'a> {
    fn from(b: &'a [u8]) -> Self {
        ValueRef::Bytes(b)
    }
}

impl<'a> From<&'a str> for ValueRef<'a> {
    fn from(s: &'a str) -> Self {
        ValueRef::Bytes(s.as_bytes())
    }
}

impl<'a> From<Vec<ValueRef<'a>>> for ValueRef<'a> {
    fn from(l: Vec<ValueRef<'a>>) -> Self {
        ValueRef::List(l)
    }
}

impl<'a> From<BTreeMap<&'a [u8], ValueRef<'a>>> for ValueRef<'a> {
    fn from(d: BTreeMap<&'a [u8], ValueRef<'a>>) -> Self {
        ValueRef::Dict(d)
    }
}

impl PartialEq<ValueRef<'_>> for Value {
    fn eq(&self, other: &ValueRef<'_>) -> bool {
        match (self, other) {
            (Value::Integer(a), ValueRef::Integer(b)) => a == b,
            (Value::Bytes(a), ValueRef::Bytes(b)) => a.as_ref() == *b,
            (Value::List(a), ValueRef::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (Value::Dict(a), ValueRef::Dict(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka.as_ref() == *kb && va == vb)
            }
            _ => false,
        }
    }
}
