use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::{self, Write};

use bytes::Bytes;

use super::*;
use crate::decode::decode;
use crate::error::BencodeError;
use crate::value::Value;

/// A sink that accepts `limit` bytes and then fails every write.
struct FailingSink {
    written: Vec<u8>,
    limit: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() >= self.limit {
            return Err(io::Error::new(io::ErrorKind::Other, "sink full"));
        }
        let n = buf.len().min(self.limit - self.written.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode(&Value::Integer(42)).unwrap(), b"i42e");
    assert_eq!(encode(&Value::Integer(-42)).unwrap(), b"i-42e");
    assert_eq!(encode(&Value::Integer(0)).unwrap(), b"i0e");
    assert_eq!(encode(&i64::MIN).unwrap(), b"i-9223372036854775808e");
}

#[test]
fn test_encode_native_integers() {
    assert_eq!(encode(&7u16).unwrap(), b"i7e");
    assert_eq!(encode(&-7i8).unwrap(), b"i-7e");
    assert_eq!(encode(&(i64::MAX as u64)).unwrap(), b"i9223372036854775807e");
    assert!(matches!(
        encode(&u64::MAX),
        Err(BencodeError::IntegerOverflow)
    ));
    assert!(matches!(
        encode(&(i128::from(i64::MIN) - 1)),
        Err(BencodeError::IntegerOverflow)
    ));
}

#[test]
fn test_encode_bytes() {
    assert_eq!(
        encode(&Value::Bytes(Bytes::from_static(b"spam"))).unwrap(),
        b"4:spam"
    );
    assert_eq!(encode("").unwrap(), b"0:");
    assert_eq!(encode(&String::from("hello")).unwrap(), b"5:hello");
    assert_eq!(encode(&AsString([0xffu8, 0x00])).unwrap(), b"2:\xff\x00");
}

#[test]
fn test_encode_list() {
    let list = Value::List(vec![
        Value::Bytes(Bytes::from_static(b"spam")),
        Value::Integer(42),
    ]);
    assert_eq!(encode(&list).unwrap(), b"l4:spami42ee");
    assert_eq!(encode(&Vec::<Value>::new()).unwrap(), b"le");
    assert_eq!(encode(&vec!["a", "bc"]).unwrap(), b"l1:a2:bce");
    assert_eq!(
        encode(&VecDeque::from(vec![vec![1i32], vec![]])).unwrap(),
        b"lli1eelee"
    );
}

#[test]
fn test_encode_dict_sorted() {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"spam"), Value::string("eggs"));
    dict.insert(Bytes::from_static(b"cow"), Value::string("moo"));
    assert_eq!(
        encode(&Value::Dict(dict)).unwrap(),
        b"d3:cow3:moo4:spam4:eggse"
    );
}

#[test]
fn test_encode_hash_map_sorts_keys() {
    let mut map = HashMap::new();
    for key in ["zeta", "alpha", "mid", "a", "b"] {
        map.insert(key.to_string(), key.len() as i64);
    }
    assert_eq!(
        encode(&map).unwrap(),
        b"d1:ai1e5:alphai5e1:bi1e3:midi3e4:zetai4ee"
    );
}

#[test]
fn test_encode_native_map() {
    let mut map = BTreeMap::new();
    map.insert("list", vec![1i64, 2]);
    map.insert("empty", vec![]);
    assert_eq!(encode(&map).unwrap(), b"d5:emptyle4:listli1ei2eee");
}

#[test]
fn test_encode_value_ref() {
    let data = b"d3:cow3:moo4:listli1ei-2e0:ee";
    let view = crate::decode::decode_view(data).unwrap();
    assert_eq!(encode(&view).unwrap(), data);
}

#[test]
fn test_roundtrip() {
    // Keys must be sorted lexicographically for bencode roundtrip
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap();
    let encoded = encode(&decoded).unwrap();
    assert_eq!(encoded, original);
}

#[test]
fn test_encode_is_idempotent() {
    let value = decode(b"d1:ali1ei2ee1:bd1:c0:ee").unwrap();
    assert_eq!(encode(&value).unwrap(), encode(&value).unwrap());
}

#[test]
fn test_list_encoder() {
    let mut out: Vec<u8> = Vec::new();
    let mut list = ListEncoder::new(&mut out).unwrap();
    list.add("spam").unwrap();
    list.add("eggs").unwrap();
    list.end().unwrap();
    assert_eq!(out, b"l4:spam4:eggse");
}

#[test]
fn test_list_encoder_nested() {
    let mut out: Vec<u8> = Vec::new();
    let mut list = ListEncoder::new(&mut out).unwrap();
    list.add(&1i64).unwrap();
    list.add(&vec![Value::string("x")]).unwrap();
    list.end().unwrap();
    assert_eq!(out, b"li1el1:xee");
    assert_eq!(
        decode(&out).unwrap(),
        Value::List(vec![
            Value::Integer(1),
            Value::List(vec![Value::string("x")])
        ])
    );
}

#[test]
fn test_list_encoder_terminates_on_drop() {
    fn write_items(out: &mut Vec<u8>, fail: bool) -> Result<(), BencodeError> {
        let mut list = ListEncoder::new(out)?;
        list.add(&1i64)?;
        if fail {
            return Err(BencodeError::InvalidType);
        }
        list.add(&2i64)?;
        list.end()
    }

    let mut out = Vec::new();
    assert!(write_items(&mut out, true).is_err());
    assert_eq!(out, b"li1ee");
    assert!(decode(&out).is_ok());

    let mut out = Vec::new();
    write_items(&mut out, false).unwrap();
    assert_eq!(out, b"li1ei2ee");
}

#[test]
fn test_dict_encoder() {
    let mut out: Vec<u8> = Vec::new();
    let mut dict = DictEncoder::new(&mut out).unwrap();
    dict.add("cow", "moo").unwrap();
    dict.add(b"spam", &vec!["a", "b"]).unwrap();
    dict.end().unwrap();
    assert_eq!(out, b"d3:cow3:moo4:spaml1:a1:bee");
}

#[test]
fn test_dict_encoder_keeps_caller_order() {
    let mut out: Vec<u8> = Vec::new();
    {
        let mut dict = DictEncoder::new(&mut out).unwrap();
        dict.add("b", &1i64).unwrap().add("a", &2i64).unwrap();
    }
    assert_eq!(out, b"d1:bi1e1:ai2ee");
}

#[test]
fn test_encode_list_heterogeneous() {
    let mut out: Vec<u8> = Vec::new();
    let nested = Value::List(vec![]);
    encode_list(&mut out, &[&"spam", &-3i32, &nested]).unwrap();
    assert_eq!(out, b"l4:spami-3elee");
}

#[test]
fn test_encode_dict_heterogeneous() {
    let mut out: Vec<u8> = Vec::new();
    encode_dict(
        &mut out,
        &[(b"a".as_slice(), &1i64), (b"b".as_slice(), &"two")],
    )
    .unwrap();
    assert_eq!(out, b"d1:ai1e1:b3:twoe");
}

#[test]
fn test_bencode_macros() {
    let mut out: Vec<u8> = Vec::new();
    crate::bencode_list!(&mut out, "spam", 4i64, vec![1u32]).unwrap();
    assert_eq!(out, b"l4:spami4eli1eee");

    let mut out: Vec<u8> = Vec::new();
    crate::bencode_dict!(&mut out, "cow" => "moo", b"n" => 3i64,).unwrap();
    assert_eq!(out, b"d3:cow3:moo1:ni3ee");

    let mut out: Vec<u8> = Vec::new();
    crate::bencode_list!(&mut out).unwrap();
    assert_eq!(out, b"le");
}

#[test]
fn test_encode_to_writer() {
    let mut out = io::Cursor::new(Vec::new());
    encode_to(&mut out, &Value::Integer(5)).unwrap();
    encode_to(&mut out, "ab").unwrap();
    assert_eq!(out.into_inner(), b"i5e2:ab");
}

#[test]
fn test_encode_sink_error() {
    let mut sink = FailingSink {
        written: Vec::new(),
        limit: 3,
    };
    let value = Value::List(vec![Value::string("spam")]);
    assert!(matches!(
        encode_to(&mut sink, &value),
        Err(BencodeError::Io(_))
    ));
}

#[test]
fn test_encode_dyn() {
    let mut out: Vec<u8> = Vec::new();
    encode_dyn(&mut out, &Value::Integer(1)).unwrap();
    encode_dyn(&mut out, &String::from("ab")).unwrap();
    encode_dyn(&mut out, &b"xyz".to_vec()).unwrap();
    encode_dyn(&mut out, &vec![Value::Integer(2)]).unwrap();
    encode_dyn(&mut out, &"s").unwrap();
    assert_eq!(out, b"i1e2:ab3:xyzli2ee1:s");
}

#[test]
fn test_encode_dyn_invalid_type() {
    let mut out: Vec<u8> = Vec::new();
    assert!(matches!(
        encode_dyn(&mut out, &3.5f32),
        Err(BencodeError::InvalidType)
    ));
    assert!(matches!(
        encode_dyn(&mut out, &vec![1u8, 2]),
        Ok(())
    ));
    assert!(matches!(
        encode_dyn(&mut out, &Some(1i64)),
        Err(BencodeError::InvalidType)
    ));
}
