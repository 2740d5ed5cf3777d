//! RFC 5246 §7.4.4: the server asks the client to authenticate with a
//! certificate. Only sent when the negotiated suite is certificate-based.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::signature_hash_algorithm::SignatureHashAlgorithm;

const CLIENT_CERT_TYPE_ECDSA_SIGN: u8 = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct CertificateRequest {
    pub certificate_types: Vec<u8>,
    pub signature_hash_algorithms: Vec<SignatureHashAlgorithm>,
}

impl Default for CertificateRequest {
    fn default() -> Self {
        CertificateRequest {
            certificate_types: vec![CLIENT_CERT_TYPE_ECDSA_SIGN],
            signature_hash_algorithms: crate::signature_hash_algorithm::default_signature_hash_algorithms(),
        }
    }
}

impl CertificateRequest {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.certificate_types.len() as u8)?;
        writer.write_all(&self.certificate_types)?;

        writer.write_u16::<BigEndian>((self.signature_hash_algorithms.len() * 2) as u16)?;
        for algo in &self.signature_hash_algorithms {
            algo.marshal(writer)?;
        }

        writer.write_u16::<BigEndian>(0)?; // no distinguished names offered
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let types_len = reader.read_u8().map_err(Error::from)? as usize;
        let mut certificate_types = vec![0u8; types_len];
        reader.read_exact(&mut certificate_types).map_err(Error::from)?;

        let algos_len = reader.read_u16::<BigEndian>().map_err(Error::from)? as usize;
        if algos_len % 2 != 0 {
            return Err(Error::AlertDecodeError(
                "odd signature_hash_algorithms length".into(),
            ));
        }
        let mut signature_hash_algorithms = Vec::with_capacity(algos_len / 2);
        for _ in 0..algos_len / 2 {
            signature_hash_algorithms.push(SignatureHashAlgorithm::unmarshal(reader)?);
        }

        let dn_len = reader.read_u16::<BigEndian>().map_err(Error::from)? as usize;
        let mut dn = vec![0u8; dn_len];
        reader.read_exact(&mut dn).map_err(Error::from)?;

        Ok(CertificateRequest {
            certificate_types,
            signature_hash_algorithms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_default() {
        let req = CertificateRequest::default();
        let mut buf = Vec::new();
        req.marshal(&mut buf).unwrap();
        let parsed = CertificateRequest::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn rejects_odd_signature_hash_algorithms_length() {
        let mut buf = vec![0u8]; // certificate_types length 0
        buf.extend_from_slice(&1u16.to_be_bytes()); // odd byte length
        buf.push(0u8);
        buf.extend_from_slice(&0u16.to_be_bytes()); // distinguished names length
        let err = CertificateRequest::unmarshal(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::AlertDecodeError(_)));
    }
}
