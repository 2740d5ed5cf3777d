//! RFC 6347 §4.2.1. DTLS-only: carries the server's stateless cookie
//! challenge back to the client before any per-connection state exists.

use std::io::{Read, Write};

use crate::content::ProtocolVersion;
use crate::error::{Error, Result};

const MAX_COOKIE_LENGTH: usize = 255;

#[derive(Clone, Debug, PartialEq)]
pub struct HelloVerifyRequest {
    pub version: ProtocolVersion,
    pub cookie: Vec<u8>,
}

impl HelloVerifyRequest {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.cookie.len() > MAX_COOKIE_LENGTH {
            return Err(Error::InvalidArgument("cookie too long".into()));
        }
        writer.write_all(&[self.version.major, self.version.minor])?;
        writer.write_all(&[self.cookie.len() as u8])?;
        writer.write_all(&self.cookie)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let mut version_bytes = [0u8; 2];
        reader.read_exact(&mut version_bytes).map_err(Error::from)?;
        let mut len_byte = [0u8; 1];
        reader.read_exact(&mut len_byte).map_err(Error::from)?;
        let mut cookie = vec![0u8; len_byte[0] as usize];
        reader.read_exact(&mut cookie).map_err(Error::from)?;
        Ok(HelloVerifyRequest {
            version: ProtocolVersion {
                major: version_bytes[0],
                minor: version_bytes[1],
            },
            cookie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_cookie() {
        let hvr = HelloVerifyRequest {
            version: ProtocolVersion::DTLS1_2,
            cookie: vec![1, 2, 3, 4, 5, 6],
        };
        let mut buf = Vec::new();
        hvr.marshal(&mut buf).unwrap();
        let parsed = HelloVerifyRequest::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, hvr);
    }

    #[test]
    fn rejects_oversized_cookie() {
        let hvr = HelloVerifyRequest {
            version: ProtocolVersion::DTLS1_2,
            cookie: vec![0u8; MAX_COOKIE_LENGTH + 1],
        };
        let mut buf = Vec::new();
        assert!(hvr.marshal(&mut buf).is_err());
    }
}
