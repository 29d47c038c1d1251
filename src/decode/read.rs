//! Input strategies for the decoder.
//!
//! [`SliceRead`] and [`BytesRead`] have random access to their input: they
//! know how many bytes remain, so a string read checks the length once and
//! then copies or slices the whole run. [`IoRead`] and [`IterRead`] are
//! sequential: they only ever see the next byte, check for exhaustion on
//! every step, and can only produce owned copies.

use std::io::{self, BufRead};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::BencodeError;

/// Sequential sources grow string buffers in steps of this size instead of
/// trusting the length prefix for a single allocation.
const READ_CHUNK: usize = 64 * 1024;

/// A byte source the decoder can pull from.
///
/// The decoder only ever looks one byte ahead and never asks how much input
/// remains, so a reader can be backed by anything that yields bytes in
/// order.
pub trait Read {
    /// Returns the next byte without consuming it, or `None` at the end of
    /// input.
    fn peek(&mut self) -> Result<Option<u8>, BencodeError>;

    /// Consumes the byte returned by the preceding [`peek`](Read::peek).
    fn discard(&mut self);

    /// Number of bytes consumed so far.
    fn position(&self) -> usize;

    /// Reads exactly `len` bytes into an owned buffer.
    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError>;
}

/// A reader whose bytes live in a buffer that outlives the decoded tree,
/// allowing strings to be returned as slices of it.
pub trait BorrowRead<'de>: Read {
    fn read_borrowed(&mut self, len: usize) -> Result<&'de [u8], BencodeError>;
}

impl<R: Read + ?Sized> Read for &mut R {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        (**self).peek()
    }

    fn discard(&mut self) {
        (**self).discard()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError> {
        (**self).read_bytes(len)
    }
}

/// Random-access reader over a borrowed slice.
#[derive(Debug, Clone)]
pub struct SliceRead<'a> {
    slice: &'a [u8],
    pos: usize,
}

impl<'a> SliceRead<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        Self { slice, pos: 0 }
    }

    /// The bytes that have not been consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.slice[self.pos..]
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], BencodeError> {
        if self.slice.len() - self.pos < len {
            return Err(BencodeError::UnexpectedEndOfInput);
        }
        let run = &self.slice[self.pos..self.pos + len];
        self.pos += len;
        Ok(run)
    }
}

impl Read for SliceRead<'_> {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        Ok(self.slice.get(self.pos).copied())
    }

    fn discard(&mut self) {
        self.pos += 1;
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError> {
        self.take(len).map(Bytes::copy_from_slice)
    }
}

impl<'a> BorrowRead<'a> for SliceRead<'a> {
    fn read_borrowed(&mut self, len: usize) -> Result<&'a [u8], BencodeError> {
        self.take(len)
    }
}

/// Random-access reader over a shared [`Bytes`] buffer.
///
/// Strings are returned as reference-counted slices of the input, so the
/// decoded tree owns its data without copying it.
#[derive(Debug, Clone)]
pub struct BytesRead {
    bytes: Bytes,
    pos: usize,
}

impl BytesRead {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> Bytes {
        self.bytes.slice(self.pos..)
    }
}

impl Read for BytesRead {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        Ok(self.bytes.get(self.pos).copied())
    }

    fn discard(&mut self) {
        self.pos += 1;
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError> {
        if self.bytes.len() - self.pos < len {
            return Err(BencodeError::UnexpectedEndOfInput);
        }
        let run = self.bytes.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(run)
    }
}

/// Sequential reader over a buffered I/O source.
///
/// Lookahead goes through [`BufRead::fill_buf`], so peeking never loses a
/// byte: after a value has been decoded the source is positioned exactly
/// after it.
#[derive(Debug)]
pub struct IoRead<R> {
    reader: R,
    pos: usize,
}

impl<R: BufRead> IoRead<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> Result<&[u8], BencodeError> {
        loop {
            match self.reader.fill_buf() {
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.reader.fill_buf()?)
    }
}

impl<R: BufRead> Read for IoRead<R> {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        Ok(self.fill()?.first().copied())
    }

    fn discard(&mut self) {
        self.reader.consume(1);
        self.pos += 1;
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError> {
        let mut out = BytesMut::with_capacity(len.min(READ_CHUNK));
        while out.len() < len {
            let available = self.fill()?;
            if available.is_empty() {
                return Err(BencodeError::UnexpectedEndOfInput);
            }
            let take = available.len().min(len - out.len());
            out.extend_from_slice(&available[..take]);
            self.reader.consume(take);
            self.pos += take;
        }
        Ok(out.freeze())
    }
}

/// Sequential reader over any byte iterator.
#[derive(Debug)]
pub struct IterRead<I> {
    iter: I,
    peeked: Option<u8>,
    pos: usize,
}

impl<I: Iterator<Item = u8>> IterRead<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            peeked: None,
            pos: 0,
        }
    }
}

impl<I: Iterator<Item = u8>> Read for IterRead<I> {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        if self.peeked.is_none() {
            self.peeked = self.iter.next();
        }
        Ok(self.peeked)
    }

    fn discard(&mut self) {
        if self.peeked.take().is_some() {
            self.pos += 1;
        }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError> {
        let mut out = BytesMut::with_capacity(len.min(READ_CHUNK));
        for _ in 0..len {
            match self.peek()? {
                Some(b) => {
                    out.put_u8(b);
                    self.discard();
                }
                None => return Err(BencodeError::UnexpectedEndOfInput),
            }
        }
        Ok(out.freeze())
    }
}
