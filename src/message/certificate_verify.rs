//! RFC 5246 §7.4.8: proof of possession of the client certificate's
//! private key, signed over the transcript hash so far.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::signature_hash_algorithm::SignatureHashAlgorithm;

#[derive(Clone, Debug, PartialEq)]
pub struct CertificateVerify {
    pub signature_algorithm: SignatureHashAlgorithm,
    pub signature: Vec<u8>,
}

impl CertificateVerify {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.signature_algorithm.marshal(writer)?;
        writer.write_u16::<BigEndian>(self.signature.len() as u16)?;
        writer.write_all(&self.signature)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let signature_algorithm = SignatureHashAlgorithm::unmarshal(reader)?;
        let sig_len = reader.read_u16::<BigEndian>().map_err(Error::from)? as usize;
        let mut signature = vec![0u8; sig_len];
        reader.read_exact(&mut signature).map_err(Error::from)?;
        Ok(CertificateVerify {
            signature_algorithm,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_signature() {
        let cv = CertificateVerify {
            signature_algorithm: SignatureHashAlgorithm::ECDSA_SHA256,
            signature: vec![1, 2, 3, 4, 5],
        };
        let mut buf = Vec::new();
        cv.marshal(&mut buf).unwrap();
        let parsed = CertificateVerify::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, cv);
    }
}
