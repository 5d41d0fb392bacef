//! ILP fulfillment data packet: the receiver's response payload.

use bytes::{BufMut, Bytes, BytesMut};

use crate::envelope::{open, seal, TYPE_ILP_FULFILLMENT};
use crate::oer::{write_var_octet_string, Reader};
use crate::Error;

/// Application data returned alongside a condition fulfillment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IlpFulfillment {
    pub data: Bytes,
}

impl IlpFulfillment {
    pub fn to_bytes(&self) -> Bytes {
        let mut contents = BytesMut::with_capacity(self.data.len() + 8);
        write_var_octet_string(&mut contents, &self.data);
        // extensibility
        contents.put_u8(0);
        seal(TYPE_ILP_FULFILLMENT, &contents)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(open(TYPE_ILP_FULFILLMENT, buf)?);
        let data = Bytes::copy_from_slice(reader.read_var_octet_string()?);
        Ok(Self { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IlpPayment;

    #[test]
    fn known_encoding() {
        let packet = IlpFulfillment {
            data: Bytes::from_static(b"ok"),
        };
        assert_eq!(packet.to_bytes().to_vec(), vec![9, 4, 2, b'o', b'k', 0]);
    }

    #[test]
    fn empty_data() {
        let packet = IlpFulfillment::default();
        assert_eq!(packet.to_bytes().to_vec(), vec![9, 2, 0, 0]);
        assert_eq!(IlpFulfillment::from_bytes(&packet.to_bytes()).unwrap(), packet);
    }

    #[test]
    fn payment_is_not_a_fulfillment() {
        let payment = IlpPayment {
            account: "g.a".to_string(),
            amount: 0,
            data: Bytes::new(),
        };
        assert!(matches!(
            IlpFulfillment::from_bytes(&payment.to_bytes()),
            Err(Error::UnexpectedType { actual: 1, .. })
        ));
    }
}
