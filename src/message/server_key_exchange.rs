//! RFC 5246 §7.4.3, restricted to the ECDHE params shape RFC 4492 §5.4
//! defines, since `EcdheRsaWithAes128GcmSha256` is the only certificate
//! suite this crate negotiates. PSK suites never send this message.

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::signature_hash_algorithm::SignatureHashAlgorithm;

const CURVE_TYPE_NAMED_CURVE: u8 = 3;
const NAMED_CURVE_SECP256R1: u16 = 23;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerKeyExchange {
    pub public_key: Vec<u8>,
    pub signature_algorithm: SignatureHashAlgorithm,
    pub signature: Vec<u8>,
}

impl ServerKeyExchange {
    /// The portion of the message that is actually signed (curve params
    /// and public key, RFC 4492 §5.4), needed by the FSM to build the
    /// signature input and re-verify it on the client side.
    pub fn signed_params(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(CURVE_TYPE_NAMED_CURVE);
        buf.extend_from_slice(&NAMED_CURVE_SECP256R1.to_be_bytes());
        buf.push(self.public_key.len() as u8);
        buf.extend_from_slice(&self.public_key);
        buf
    }

    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.signed_params())?;
        self.signature_algorithm.marshal(writer)?;
        writer.write_u16::<byteorder::BigEndian>(self.signature.len() as u16)?;
        writer.write_all(&self.signature)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let curve_type = reader.read_u8().map_err(Error::from)?;
        if curve_type != CURVE_TYPE_NAMED_CURVE {
            return Err(Error::AlertHandshakeFailure(
                "only named_curve ECDHE params are supported".into(),
            ));
        }
        let named_curve = reader.read_u16::<byteorder::BigEndian>().map_err(Error::from)?;
        if named_curve != NAMED_CURVE_SECP256R1 {
            return Err(Error::AlertHandshakeFailure(
                "only secp256r1 is supported".into(),
            ));
        }
        let pubkey_len = reader.read_u8().map_err(Error::from)? as usize;
        let mut public_key = vec![0u8; pubkey_len];
        reader.read_exact(&mut public_key).map_err(Error::from)?;

        let signature_algorithm = SignatureHashAlgorithm::unmarshal(reader)?;
        let sig_len = reader.read_u16::<byteorder::BigEndian>().map_err(Error::from)? as usize;
        let mut signature = vec![0u8; sig_len];
        reader.read_exact(&mut signature).map_err(Error::from)?;

        Ok(ServerKeyExchange {
            public_key,
            signature_algorithm,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let ske = ServerKeyExchange {
            public_key: vec![4, 9, 9, 9],
            signature_algorithm: SignatureHashAlgorithm::ECDSA_SHA256,
            signature: vec![1, 2, 3],
        };
        let mut buf = Vec::new();
        ske.marshal(&mut buf).unwrap();
        let parsed = ServerKeyExchange::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, ske);
    }

    #[test]
    fn rejects_unsupported_curve() {
        let ske = ServerKeyExchange {
            public_key: vec![4, 9, 9, 9],
            signature_algorithm: SignatureHashAlgorithm::ECDSA_SHA256,
            signature: vec![1, 2, 3],
        };
        let mut buf = Vec::new();
        ske.marshal(&mut buf).unwrap();
        buf[0] = 0xFF;
        let err = ServerKeyExchange::unmarshal(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::AlertHandshakeFailure(_)));
    }
}
