//! Type-tagged envelope shared by all packet kinds.
//!
//! Wire form: one type byte followed by the contents as a var-octet-string.

use bytes::{BufMut, Bytes, BytesMut};

use crate::oer::{write_var_octet_string, Reader};
use crate::Error;

/// Envelope type of an ILP payment packet.
pub const TYPE_ILP_PAYMENT: u8 = 1;

/// Envelope type of an ILP fulfillment data packet.
pub const TYPE_ILP_FULFILLMENT: u8 = 9;

pub(crate) fn seal(packet_type: u8, contents: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(contents.len() + 4);
    buf.put_u8(packet_type);
    write_var_octet_string(&mut buf, contents);
    buf.freeze()
}

/// Check the type byte and return the contents.
pub(crate) fn open(expected: u8, buf: &[u8]) -> Result<&[u8], Error> {
    let mut reader = Reader::new(buf);
    let actual = reader.read_u8()?;
    if actual != expected {
        return Err(Error::UnexpectedType { expected, actual });
    }
    let contents = reader.read_var_octet_string()?;
    if reader.remaining() > 0 {
        return Err(Error::TrailingBytes(reader.remaining()));
    }
    Ok(contents)
}

/// Peek at the type byte of an encoded envelope.
pub fn packet_type(buf: &[u8]) -> Result<u8, Error> {
    buf.first().copied().ok_or(Error::UnexpectedEnd)
}
