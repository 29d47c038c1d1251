use std::collections::BTreeMap;
use std::io::Cursor;

use bytes::Bytes;
use proptest::prelude::*;

use super::*;

#[test]
fn test_decode_scenarios() {
    assert_eq!(decode(b"4:spam").unwrap(), Value::string("spam"));
    assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
    assert_eq!(decode(b"i-13e").unwrap(), Value::Integer(-13));
    assert_eq!(
        decode(b"l4:spam4:eggse").unwrap(),
        Value::List(vec![Value::string("spam"), Value::string("eggs")])
    );

    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"cow"), Value::string("moo"));
    dict.insert(Bytes::from_static(b"spam"), Value::string("eggs"));
    assert_eq!(
        decode(b"d3:cow3:moo4:spam4:eggse").unwrap(),
        Value::Dict(dict)
    );
}

#[test]
fn test_streaming_list_matches_tree_encoding() {
    let mut out: Vec<u8> = Vec::new();
    let mut list = ListEncoder::new(&mut out).unwrap();
    list.add("spam").unwrap();
    list.add("eggs").unwrap();
    list.end().unwrap();

    assert_eq!(out, b"l4:spam4:eggse");
    assert_eq!(out, encode(&decode(b"l4:spam4:eggse").unwrap()).unwrap());
}

#[test]
fn test_rejection_set() {
    for input in [&b"i e"[..], b"i-e", b"i03e"] {
        assert!(
            matches!(decode(input), Err(BencodeError::UnexpectedToken { .. })),
            "{:?}",
            String::from_utf8_lossy(input)
        );
    }
    for input in [&b"5:ab"[..], b"l1:a", b"li1e", b"d1:a", b"d1:ai1e"] {
        assert!(
            matches!(decode(input), Err(BencodeError::UnexpectedEndOfInput)),
            "{:?}",
            String::from_utf8_lossy(input)
        );
    }
    match decode(b"d1:a1:x1:a1:ye") {
        Err(BencodeError::DuplicateDictKey(key)) => assert_eq!(&key[..], b"a"),
        other => panic!("expected duplicate key error, got {:?}", other),
    }
    assert!(matches!(
        decode(b"i9223372036854775808e"),
        Err(BencodeError::IntegerOverflow)
    ));
}

#[test]
fn test_view_aliases_input() {
    let mut data = b"l4:spame".to_vec();
    {
        let view = decode_view(&data).unwrap();
        let item = view.as_list().unwrap()[0].as_bytes().unwrap();
        assert_eq!(item.as_ptr(), data[3..].as_ptr());
    }
    data[3..7].copy_from_slice(b"eggs");
    let view = decode_view(&data).unwrap();
    assert_eq!(view.as_list().unwrap()[0].as_str(), Some("eggs"));
}

#[test]
fn test_decoder_is_reusable_after_error() {
    assert!(decode(b"i1").is_err());
    assert_eq!(decode(b"i1e").unwrap(), Value::Integer(1));
}

#[test]
fn test_concurrent_decode_encode() {
    let inputs: Vec<Vec<u8>> = (0..8i64)
        .map(|i| encode(&Value::List(vec![Value::Integer(i), Value::string("x")])).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for (i, input) in inputs.iter().enumerate() {
            scope.spawn(move || {
                let value = decode(input).unwrap();
                assert_eq!(value.as_list().unwrap()[0].as_integer(), Some(i as i64));
                assert_eq!(&encode(&value).unwrap(), input);
            });
        }
    });
}

#[test]
fn test_value_kinds() {
    let data = b"li1e1:alede";
    let value = decode(data).unwrap();
    assert_eq!(value.kind(), Kind::List);
    let kinds: Vec<Kind> = value.as_list().unwrap().iter().map(Value::kind).collect();
    assert_eq!(kinds, vec![Kind::Integer, Kind::Bytes, Kind::List, Kind::Dict]);

    let view = decode_view(data).unwrap();
    let view_kinds: Vec<Kind> = view.as_list().unwrap().iter().map(ValueRef::kind).collect();
    assert_eq!(view_kinds, kinds);

    assert_eq!(Kind::Bytes.to_string(), "byte string");
    assert_eq!(Kind::Dict.to_string(), "dictionary");
}

fn arb_bytes(max: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..max).prop_map(Bytes::from)
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        arb_bytes(24).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::btree_map(arb_bytes(8), inner, 0..6).prop_map(Value::Dict),
        ]
    })
}

proptest! {
    #[test]
    fn prop_roundtrip(value in arb_value()) {
        let encoded = encode(&value).unwrap();
        prop_assert_eq!(decode(&encoded).unwrap(), value);
    }

    #[test]
    fn prop_encode_is_idempotent(value in arb_value()) {
        let first = encode(&value).unwrap();
        let second = encode(&decode(&first).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_view_matches_copy(value in arb_value()) {
        let encoded = encode(&value).unwrap();
        let view = decode_view(&encoded).unwrap();
        prop_assert_eq!(view.to_owned_value(), value);
    }

    #[test]
    fn prop_readers_agree(value in arb_value()) {
        let encoded = encode(&value).unwrap();
        prop_assert_eq!(decode_iter(encoded.iter().copied()).unwrap(), value.clone());
        prop_assert_eq!(decode_bytes(&Bytes::from(encoded.clone())).unwrap(), value.clone());

        let decoded = decode_reader(&mut Cursor::new(&encoded), EofBehavior::Check).unwrap();
        prop_assert!(decoded.exhausted);
        prop_assert_eq!(decoded.value, value);
    }

    #[test]
    fn prop_stream_of_values(values in prop::collection::vec(arb_value(), 0..5)) {
        let mut stream: Vec<u8> = Vec::new();
        for value in &values {
            encode_to(&mut stream, value).unwrap();
        }
        let decoded: Result<Vec<Value>, BencodeError> = Decoder::from_slice(&stream).collect();
        prop_assert_eq!(decoded.unwrap(), values);
    }

    #[test]
    fn prop_arbitrary_input_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = decode(&data);
        let _ = decode_view(&data);
        let _ = decode_iter(data.iter().copied());
    }
}
