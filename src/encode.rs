//! Streaming bencode encoding.

mod builder;

use std::any::Any;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::io::Write;

use bytes::{Bytes, BytesMut};
use tracing::trace;

pub use builder::{encode_dict, encode_list, DictEncoder, ListEncoder};

use crate::error::BencodeError;
use crate::value::{Value, ValueRef};

/// A type that can be written as bencode.
///
/// Implemented for [`Value`], [`ValueRef`], native integers, strings,
/// [`Bytes`], sequences and byte-keyed maps. `u8` is deliberately not an
/// integer here, so `Vec<u8>` is not mistaken for a list; wrap raw bytes in
/// [`AsString`] to write them as a byte string.
///
/// The trait is object safe, so mixed values can be passed as
/// `&[&dyn Encode]` to [`encode_list`].
pub trait Encode {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError>;
}

/// Encodes a value into a new buffer.
///
/// # Examples
///
/// ```
/// use rbencode::{encode, Value};
/// use std::collections::BTreeMap;
/// use bytes::Bytes;
///
/// assert_eq!(encode(&Value::Integer(42)).unwrap(), b"i42e");
/// assert_eq!(encode("hello").unwrap(), b"5:hello");
/// assert_eq!(encode(&vec![1i64, 2]).unwrap(), b"li1ei2ee");
///
/// let mut dict = BTreeMap::new();
/// dict.insert(Bytes::from_static(b"b"), Value::Integer(2));
/// dict.insert(Bytes::from_static(b"a"), Value::Integer(1));
/// assert_eq!(encode(&Value::Dict(dict)).unwrap(), b"d1:ai1e1:bi2ee");
/// ```
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    let mut buf: Vec<u8> = Vec::new();
    value.encode(&mut buf)?;
    trace!(len = buf.len(), "encoded bencode value");
    Ok(buf)
}

/// Encodes a value directly into `sink`.
pub fn encode_to<W: Write, T: Encode + ?Sized>(sink: &mut W, value: &T) -> Result<(), BencodeError> {
    value.encode(sink)
}

/// Encodes a type-erased value by inspecting its concrete type at runtime.
///
/// Accepts [`Value`], integers (`i64`, `i32`, `u32`, `usize`), `String`,
/// `&'static str`, [`Bytes`], `Vec<u8>` (as a byte string), `Vec<Value>`
/// and `BTreeMap<Bytes, Value>`.
///
/// # Errors
///
/// Returns [`BencodeError::InvalidType`] for any other type.
///
/// ```
/// use rbencode::{encode_dyn, BencodeError};
/// use std::any::Any;
///
/// let mut out: Vec<u8> = Vec::new();
/// encode_dyn(&mut out, &7i64 as &dyn Any).unwrap();
/// assert_eq!(out, b"i7e");
///
/// let err = encode_dyn(&mut out, &1.5f64 as &dyn Any).unwrap_err();
/// assert!(matches!(err, BencodeError::InvalidType));
/// ```
pub fn encode_dyn(sink: &mut dyn Write, value: &dyn Any) -> Result<(), BencodeError> {
    if let Some(v) = value.downcast_ref::<Value>() {
        v.encode(sink)
    } else if let Some(i) = value.downcast_ref::<i64>() {
        i.encode(sink)
    } else if let Some(i) = value.downcast_ref::<i32>() {
        i.encode(sink)
    } else if let Some(i) = value.downcast_ref::<u32>() {
        i.encode(sink)
    } else if let Some(i) = value.downcast_ref::<usize>() {
        i.encode(sink)
    } else if let Some(s) = value.downcast_ref::<String>() {
        s.encode(sink)
    } else if let Some(s) = value.downcast_ref::<&'static str>() {
        s.encode(sink)
    } else if let Some(b) = value.downcast_ref::<Bytes>() {
        b.encode(sink)
    } else if let Some(b) = value.downcast_ref::<Vec<u8>>() {
        write_bytes(sink, b)
    } else if let Some(l) = value.downcast_ref::<Vec<Value>>() {
        l.encode(sink)
    } else if let Some(d) = value.downcast_ref::<BTreeMap<Bytes, Value>>() {
        d.encode(sink)
    } else {
        Err(BencodeError::InvalidType)
    }
}

pub(crate) fn write_integer(sink: &mut dyn Write, value: i64) -> Result<(), BencodeError> {
    write!(sink, "i{}e", value)?;
    Ok(())
}

pub(crate) fn write_bytes(sink: &mut dyn Write, bytes: &[u8]) -> Result<(), BencodeError> {
    write!(sink, "{}:", bytes.len())?;
    sink.write_all(bytes)?;
    Ok(())
}

/// Writes the wrapped bytes as a bencode byte string.
///
/// ```
/// use rbencode::{encode, AsString};
///
/// assert_eq!(encode(&AsString(vec![0x00u8, 0xff])).unwrap(), b"2:\x00\xff");
/// assert_eq!(encode(&AsString(b"spam")).unwrap(), b"4:spam");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsString<T>(pub T);

impl<T: AsRef<[u8]>> Encode for AsString<T> {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        write_bytes(sink, self.0.as_ref())
    }
}

impl Encode for Value {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        match self {
            Value::Integer(i) => write_integer(sink, *i),
            Value::Bytes(b) => write_bytes(sink, b),
            Value::List(l) => l.encode(sink),
            Value::Dict(d) => d.encode(sink),
        }
    }
}

impl Encode for ValueRef<'_> {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        match self {
            ValueRef::Integer(i) => write_integer(sink, *i),
            ValueRef::Bytes(b) => write_bytes(sink, b),
            ValueRef::List(l) => l.encode(sink),
            ValueRef::Dict(d) => d.encode(sink),
        }
    }
}

macro_rules! encode_int {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
                    let value = i64::try_from(*self).map_err(|_| BencodeError::IntegerOverflow)?;
                    write_integer(sink, value)
                }
            }
        )*
    };
}

encode_int!(i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize);

impl Encode for str {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        write_bytes(sink, self.as_bytes())
    }
}

impl Encode for String {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        write_bytes(sink, self.as_bytes())
    }
}

impl Encode for Bytes {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        write_bytes(sink, self)
    }
}

impl Encode for BytesMut {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        write_bytes(sink, self)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        let mut list = ListEncoder::new(sink)?;
        for item in self {
            list.add(item)?;
        }
        list.end()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        self.as_slice().encode(sink)
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        let mut list = ListEncoder::new(sink)?;
        for item in self {
            list.add(item)?;
        }
        list.end()
    }
}

impl<K: AsRef<[u8]>, V: Encode> Encode for BTreeMap<K, V> {
    /// Keys are written in the map's order, which is ascending byte order
    /// for byte-like keys.
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        let mut dict = DictEncoder::new(sink)?;
        for (key, value) in self {
            dict.add(key, value)?;
        }
        dict.end()
    }
}

impl<K: AsRef<[u8]>, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    /// Keys are sorted before they are written, so the output is canonical
    /// regardless of hash order.
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        let mut entries: Vec<(&[u8], &V)> = self.iter().map(|(k, v)| (k.as_ref(), v)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut dict = DictEncoder::new(sink)?;
        for (key, value) in entries {
            dict.add(key, value)?;
        }
        dict.end()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        (**self).encode(sink)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, sink: &mut dyn Write) -> Result<(), BencodeError> {
        (**self).encode(sink)
    }
}

#[cfg(test)]
mod tests;
