use std::io::Write;

use super::{write_bytes, Encode};
use crate::error::BencodeError;

/// Incrementally writes a bencode list.
///
/// The opening `l` is written on construction and every [`add`](Self::add)
/// encodes one element straight into the sink, so no intermediate container
/// is built. Call [`end`](Self::end) to write the closing `e` and observe any
/// error; if the encoder is dropped without it (an early return or `?`), the
/// terminator is written on drop so the output is never left unterminated.
///
/// # Examples
///
/// ```
/// use rbencode::ListEncoder;
///
/// let mut out: Vec<u8> = Vec::new();
/// let mut list = ListEncoder::new(&mut out).unwrap();
/// list.add("spam").unwrap().add("eggs").unwrap();
/// list.end().unwrap();
/// assert_eq!(out, b"l4:spam4:eggse");
/// ```
pub struct ListEncoder<'a> {
    sink: &'a mut dyn Write,
    open: bool,
}

impl<'a> ListEncoder<'a> {
    pub fn new(sink: &'a mut dyn Write) -> Result<Self, BencodeError> {
        sink.write_all(b"l")?;
        Ok(Self { sink, open: true })
    }

    pub fn add<T: Encode + ?Sized>(&mut self, value: &T) -> Result<&mut Self, BencodeError> {
        value.encode(self.sink)?;
        Ok(self)
    }

    /// Writes the closing `e`.
    pub fn end(mut self) -> Result<(), BencodeError> {
        self.open = false;
        self.sink.write_all(b"e")?;
        Ok(())
    }
}

impl Drop for ListEncoder<'_> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.sink.write_all(b"e");
        }
    }
}

/// Incrementally writes a bencode dictionary.
///
/// Keys are written in the order they are added. The encoder does not sort
/// them or check for duplicates; callers that need canonical output must add
/// keys in ascending byte order. Termination works as for [`ListEncoder`].
///
/// ```
/// use rbencode::DictEncoder;
///
/// let mut out: Vec<u8> = Vec::new();
/// let mut dict = DictEncoder::new(&mut out).unwrap();
/// dict.add("cow", "moo").unwrap().add("spam", &42i64).unwrap();
/// dict.end().unwrap();
/// assert_eq!(out, b"d3:cow3:moo4:spami42ee");
/// ```
pub struct DictEncoder<'a> {
    sink: &'a mut dyn Write,
    open: bool,
}

impl<'a> DictEncoder<'a> {
    pub fn new(sink: &'a mut dyn Write) -> Result<Self, BencodeError> {
        sink.write_all(b"d")?;
        Ok(Self { sink, open: true })
    }

    pub fn add<V: Encode + ?Sized>(
        &mut self,
        key: impl AsRef<[u8]>,
        value: &V,
    ) -> Result<&mut Self, BencodeError> {
        write_bytes(self.sink, key.as_ref())?;
        value.encode(self.sink)?;
        Ok(self)
    }

    pub fn end(mut self) -> Result<(), BencodeError> {
        self.open = false;
        self.sink.write_all(b"e")?;
        Ok(())
    }
}

impl Drop for DictEncoder<'_> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.sink.write_all(b"e");
        }
    }
}

/// Writes a list from a sequence of mixed encodable items.
///
/// ```
/// use rbencode::encode_list;
///
/// let mut out: Vec<u8> = Vec::new();
/// encode_list(&mut out, &[&"spam", &42i64, &vec![1u32]]).unwrap();
/// assert_eq!(out, b"l4:spami42eli1eee");
/// ```
pub fn encode_list(sink: &mut dyn Write, items: &[&dyn Encode]) -> Result<(), BencodeError> {
    let mut list = ListEncoder::new(sink)?;
    for item in items {
        list.add(*item)?;
    }
    list.end()
}

/// Writes a dictionary from key/value pairs, in the order given.
pub fn encode_dict(
    sink: &mut dyn Write,
    entries: &[(&[u8], &dyn Encode)],
) -> Result<(), BencodeError> {
    let mut dict = DictEncoder::new(sink)?;
    for (key, value) in entries {
        dict.add(key, *value)?;
    }
    dict.end()
}

/// Writes a bencode list of mixed items to a sink.
///
/// ```
/// let mut out: Vec<u8> = Vec::new();
/// rbencode::bencode_list!(&mut out, "spam", 42i64).unwrap();
/// assert_eq!(out, b"l4:spami42ee");
/// ```
#[macro_export]
macro_rules! bencode_list {
    ($sink:expr $(, $item:expr)* $(,)?) => {
        $crate::encode_list($sink, &[$(&$item as &dyn $crate::Encode),*])
    };
}

/// Writes a bencode dictionary of `key => value` pairs to a sink, in the
/// order given.
///
/// ```
/// let mut out: Vec<u8> = Vec::new();
/// rbencode::bencode_dict!(&mut out, "cow" => "moo", "n" => 3i64).unwrap();
/// assert_eq!(out, b"d3:cow3:moo1:ni3ee");
/// ```
#[macro_export]
macro_rules! bencode_dict {
    ($sink:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::encode_dict(
            $sink,
            &[$((
                ::core::convert::AsRef::<[u8]>::as_ref(&$key),
                &$value as &dyn $crate::Encode,
            )),*],
        )
    };
}
