//! ILP payment packet: the routing envelope carried by a legacy transfer.

use bytes::{BufMut, Bytes, BytesMut};

use crate::envelope::{open, seal, TYPE_ILP_PAYMENT};
use crate::oer::{write_var_octet_string, Reader};
use crate::Error;

/// An ILP payment packet.
///
/// `account` is the final destination address and `data` the opaque
/// application payload. The adapter always sends `amount` zero; the value
/// moves in the outer transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IlpPayment {
    pub account: String,
    pub amount: u64,
    pub data: Bytes,
}

impl IlpPayment {
    /// Encode into the enveloped wire form.
    ///
    /// # Example
    ///
    /// ```
    /// use ilp_compat_packet::IlpPayment;
    ///
    /// let packet = IlpPayment {
    ///     account: "g.usd.bob".to_string(),
    ///     amount: 0,
    ///     data: Default::default(),
    /// };
    /// let decoded = IlpPayment::from_bytes(&packet.to_bytes()).unwrap();
    /// assert_eq!(decoded, packet);
    /// ```
    pub fn to_bytes(&self) -> Bytes {
        let mut contents = BytesMut::with_capacity(self.account.len() + self.data.len() + 16);
        contents.put_u64(self.amount);
        write_var_octet_string(&mut contents, self.account.as_bytes());
        write_var_octet_string(&mut contents, &self.data);
        // extensibility
        contents.put_u8(0);
        seal(TYPE_ILP_PAYMENT, &contents)
    }

    /// Decode from the enveloped wire form.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(open(TYPE_ILP_PAYMENT, buf)?);
        let amount = reader.read_u64()?;

        let account = reader.read_var_octet_string()?;
        if !account.is_ascii() {
            return Err(Error::NonAsciiAccount);
        }
        let account = String::from_utf8_lossy(account).into_owned();

        let data = Bytes::copy_from_slice(reader.read_var_octet_string()?);

        // Older encoders omit the extensibility byte; newer ones may append
        // fields after it. Neither affects the fields read here.
        Ok(Self {
            account,
            amount,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_encoding() {
        let packet = IlpPayment {
            account: "g.us.bob".to_string(),
            amount: 0,
            data: Bytes::from_static(b"hi"),
        };

        let mut expected = vec![1, 21];
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        expected.push(8);
        expected.extend_from_slice(b"g.us.bob");
        expected.push(2);
        expected.extend_from_slice(b"hi");
        expected.push(0);

        assert_eq!(packet.to_bytes().to_vec(), expected);
    }

    #[test]
    fn amount_is_preserved() {
        let packet = IlpPayment {
            account: "example.alice".to_string(),
            amount: 1_000_000_007,
            data: Bytes::new(),
        };
        let decoded = IlpPayment::from_bytes(&packet.to_bytes()).unwrap();
        assert_eq!(decoded.amount, 1_000_000_007);
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn large_payload_survives() {
        let packet = IlpPayment {
            account: "g.eur.mary".to_string(),
            amount: 0,
            data: Bytes::from(vec![0xab; 70_000]),
        };
        let decoded = IlpPayment::from_bytes(&packet.to_bytes()).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn non_ascii_account_is_rejected() {
        let packet = IlpPayment {
            account: "g.usd.ünïcode".to_string(),
            amount: 0,
            data: Bytes::new(),
        };
        assert_eq!(
            IlpPayment::from_bytes(&packet.to_bytes()).unwrap_err(),
            Error::NonAsciiAccount
        );
    }

    #[test]
    fn missing_extensibility_byte_is_tolerated() {
        let mut contents = BytesMut::new();
        contents.put_u64(5);
        write_var_octet_string(&mut contents, b"g.a");
        write_var_octet_string(&mut contents, b"");
        let buf = seal(TYPE_ILP_PAYMENT, &contents);

        let decoded = IlpPayment::from_bytes(&buf).unwrap();
        assert_eq!(decoded.account, "g.a");
        assert_eq!(decoded.amount, 5);
    }

    #[test]
    fn truncated_packet_fails() {
        let buf = [1u8, 3, 0, 0, 0];
        assert_eq!(
            IlpPayment::from_bytes(&buf).unwrap_err(),
            Error::UnexpectedEnd
        );
    }
}
