//! Octet Encoding Rules primitives.
//!
//! Only the handful of OER shapes the envelopes need: fixed-width unsigned
//! integers and length-prefixed octet strings.
//!
//! A length prefix below 128 is a single byte. Longer lengths are written as
//! `0x80 | n` followed by `n` big-endian length bytes.

use bytes::{BufMut, BytesMut};

use crate::Error;

/// Largest number of length-of-length bytes accepted when reading.
const MAX_LENGTH_OF_LENGTH: usize = std::mem::size_of::<usize>();

pub(crate) fn write_var_octet_string(buf: &mut BytesMut, data: &[u8]) {
    write_length_prefix(buf, data.len());
    buf.put_slice(data);
}

fn write_length_prefix(buf: &mut BytesMut, len: usize) {
    if len < 0x80 {
        buf.put_u8(len as u8);
        return;
    }

    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    buf.put_u8(0x80 | significant.len() as u8);
    buf.put_slice(significant);
}

/// Cursor over an encoded buffer.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.buf.len() < n {
            return Err(Error::UnexpectedEnd);
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, Error> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(raw))
    }

    pub(crate) fn read_var_octet_string(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_length_prefix()?;
        self.take(len)
    }

    fn read_length_prefix(&mut self) -> Result<usize, Error> {
        let first = self.read_u8()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }

        let length_of_length = (first & 0x7f) as usize;
        if length_of_length == 0 || length_of_length > MAX_LENGTH_OF_LENGTH {
            return Err(Error::InvalidLengthPrefix);
        }

        let len = self
            .take(length_of_length)?
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize);
        Ok(len)
    }
}
