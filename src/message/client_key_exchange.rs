//! RFC 5246 §7.4.7 / RFC 4279 §2, carrying either a raw ECDHE public
//! point or a PSK identity depending on the negotiated key-exchange
//! family.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum ClientKeyExchange {
    Ecdhe { public_key: Vec<u8> },
    Psk { identity: Vec<u8> },
}

impl ClientKeyExchange {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            ClientKeyExchange::Ecdhe { public_key } => {
                writer.write_u8(public_key.len() as u8)?;
                writer.write_all(public_key)?;
            }
            ClientKeyExchange::Psk { identity } => {
                writer.write_u16::<BigEndian>(identity.len() as u16)?;
                writer.write_all(identity)?;
            }
        }
        Ok(())
    }

    /// The wire shape is ambiguous without knowing the negotiated suite
    /// (§4.3), so the caller supplies which variant to parse as.
    pub fn unmarshal<R: Read>(reader: &mut R, is_psk: bool) -> Result<Self> {
        if is_psk {
            let len = reader.read_u16::<BigEndian>().map_err(Error::from)? as usize;
            let mut identity = vec![0u8; len];
            reader.read_exact(&mut identity).map_err(Error::from)?;
            Ok(ClientKeyExchange::Psk { identity })
        } else {
            let len = reader.read_u8().map_err(Error::from)? as usize;
            let mut public_key = vec![0u8; len];
            reader.read_exact(&mut public_key).map_err(Error::from)?;
            Ok(ClientKeyExchange::Ecdhe { public_key })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ecdhe() {
        let cke = ClientKeyExchange::Ecdhe {
            public_key: vec![4, 1, 2, 3, 4],
        };
        let mut buf = Vec::new();
        cke.marshal(&mut buf).unwrap();
        let parsed = ClientKeyExchange::unmarshal(&mut buf.as_slice(), false).unwrap();
        assert_eq!(parsed, cke);
    }

    #[test]
    fn round_trips_psk() {
        let cke = ClientKeyExchange::Psk {
            identity: b"client-identity".to_vec(),
        };
        let mut buf = Vec::new();
        cke.marshal(&mut buf).unwrap();
        let parsed = ClientKeyExchange::unmarshal(&mut buf.as_slice(), true).unwrap();
        assert_eq!(parsed, cke);
    }
}
