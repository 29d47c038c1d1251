//! rbencode - bencode decoding and encoding ([BEP-3]).
//!
//! Bencode is the serialization format BitTorrent uses for `.torrent` files,
//! tracker responses and DHT messages. This crate parses it from byte slices,
//! shared buffers, buffered readers and plain byte iterators, and writes it
//! into any [`std::io::Write`] sink.
//!
//! # Data Types
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Examples
//!
//! ## Decoding
//!
//! ```
//! use rbencode::decode;
//!
//! let value = decode(b"i42e").unwrap();
//! assert_eq!(value.as_integer(), Some(42));
//!
//! let value = decode(b"l4:spami42ee").unwrap();
//! assert_eq!(value.as_list().unwrap().len(), 2);
//!
//! let value = decode(b"d3:foo3:bare").unwrap();
//! assert_eq!(value.get(b"foo").unwrap().as_str(), Some("bar"));
//! ```
//!
//! ## Views
//!
//! [`decode_view`] produces a [`ValueRef`] whose byte strings borrow from the
//! input instead of copying it.
//!
//! ```
//! use rbencode::decode_view;
//!
//! let data = b"d4:name8:test.txte";
//! let view = decode_view(data).unwrap();
//! let name = view.get(b"name").unwrap().as_bytes().unwrap();
//! assert_eq!(name.as_ptr(), data[9..].as_ptr());
//! ```
//!
//! ## Streams
//!
//! ```
//! use rbencode::{Decoder, Value};
//!
//! let mut decoder = Decoder::from_slice(b"i1e4:spamle");
//! assert_eq!(decoder.decode_next().unwrap(), Some(Value::Integer(1)));
//! assert_eq!(decoder.decode_next().unwrap(), Some(Value::string("spam")));
//! assert_eq!(decoder.decode_next().unwrap(), Some(Value::List(vec![])));
//! assert_eq!(decoder.decode_next().unwrap(), None);
//! ```
//!
//! ## Encoding
//!
//! ```
//! use rbencode::{encode, ListEncoder, Value};
//!
//! assert_eq!(encode(&Value::string("hello")).unwrap(), b"5:hello");
//! assert_eq!(encode(&vec![1i64, 2]).unwrap(), b"li1ei2ee");
//!
//! let mut out: Vec<u8> = Vec::new();
//! let mut list = ListEncoder::new(&mut out).unwrap();
//! list.add("spam").unwrap().add(&42i64).unwrap();
//! list.end().unwrap();
//! assert_eq!(out, b"l4:spami42ee");
//! ```
//!
//! # Error Handling
//!
//! Decoding and encoding report a [`BencodeError`]:
//!
//! - [`BencodeError::UnexpectedEndOfInput`] - Input ended inside a value
//! - [`BencodeError::UnexpectedToken`] - A byte that cannot appear where it was found
//! - [`BencodeError::DuplicateDictKey`] - A dictionary repeated a key
//! - [`BencodeError::IntegerOverflow`] - An integer or length does not fit
//! - [`BencodeError::NestingTooDeep`] - Containers nested past the configured limit
//! - [`BencodeError::TrailingData`] - Extra data after the value
//! - [`BencodeError::InvalidType`] - A runtime value with no bencode form
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{
    decode, decode_bytes, decode_bytes_with, decode_iter, decode_prefix, decode_reader,
    decode_view, decode_view_with, decode_with, BorrowRead, BytesRead, DecodeOptions, Decoded,
    Decoder, EofBehavior, IoRead, IterRead, Read, SliceRead, DEFAULT_MAX_DEPTH,
};
pub use encode::{
    encode, encode_dict, encode_dyn, encode_list, encode_to, AsString, DictEncoder, Encode,
    ListEncoder,
};
pub use error::BencodeError;
pub use value::{Kind, Value, ValueRef};

#[cfg(test)]
mod tests;
