//! RFC 5246 §7.4.2: a chain of DER certificates, leaf first.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Certificate {
    pub certificate_chain: Vec<Vec<u8>>,
}

impl Certificate {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut body = Vec::new();
        for cert in &self.certificate_chain {
            body.write_u24::<BigEndian>(cert.len() as u32)?;
            body.write_all(cert)?;
        }
        writer.write_u24::<BigEndian>(body.len() as u32)?;
        writer.write_all(&body)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let total_len = reader.read_u24::<BigEndian>().map_err(Error::from)? as usize;
        let mut body = vec![0u8; total_len];
        reader.read_exact(&mut body).map_err(Error::from)?;

        let mut cursor = body.as_slice();
        let mut certificate_chain = Vec::new();
        while !cursor.is_empty() {
            let cert_len = cursor.read_u24::<BigEndian>().map_err(Error::from)? as usize;
            if cert_len > cursor.len() {
                return Err(Error::AlertDecodeError(
                    "certificate length exceeds remaining body".into(),
                ));
            }
            let (cert, rest) = cursor.split_at(cert_len);
            certificate_chain.push(cert.to_vec());
            cursor = rest;
        }
        Ok(Certificate { certificate_chain })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_chain() {
        let cert = Certificate {
            certificate_chain: vec![vec![1, 2, 3], vec![4, 5, 6, 7]],
        };
        let mut buf = Vec::new();
        cert.marshal(&mut buf).unwrap();
        let parsed = Certificate::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, cert);
    }

    #[test]
    fn round_trips_an_empty_chain() {
        let cert = Certificate {
            certificate_chain: vec![],
        };
        let mut buf = Vec::new();
        cert.marshal(&mut buf).unwrap();
        let parsed = Certificate::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, cert);
    }
}
