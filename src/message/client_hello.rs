//! RFC 5246 §7.4.1.2, extended by RFC 6347 §4.2.1 with the DTLS `cookie`
//! field that carries the server's stateless-cookie challenge back.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cipher_suite::CipherSuiteId;
use crate::content::ProtocolVersion;
use crate::error::{Error, Result};
use crate::message::random::HandshakeRandom;

const COMPRESSION_METHOD_NULL: u8 = 0;
const MAX_COOKIE_LENGTH: usize = 255;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientHello {
    pub version: ProtocolVersion,
    pub random: HandshakeRandom,
    pub session_id: Vec<u8>,
    pub cookie: Vec<u8>,
    pub cipher_suites: Vec<CipherSuiteId>,
}

impl ClientHello {
    pub fn marshal<W: Write>(&self, writer: &mut W, is_dtls: bool) -> Result<()> {
        writer.write_u8(self.version.major)?;
        writer.write_u8(self.version.minor)?;
        self.random.marshal(writer)?;

        writer.write_u8(self.session_id.len() as u8)?;
        writer.write_all(&self.session_id)?;

        if is_dtls {
            if self.cookie.len() > MAX_COOKIE_LENGTH {
                return Err(Error::InvalidArgument("cookie too long".into()));
            }
            writer.write_u8(self.cookie.len() as u8)?;
            writer.write_all(&self.cookie)?;
        }

        writer.write_u16::<BigEndian>((self.cipher_suites.len() * 2) as u16)?;
        for suite in &self.cipher_suites {
            writer.write_u16::<BigEndian>(*suite as u16)?;
        }

        writer.write_u8(1)?; // compression_methods length
        writer.write_u8(COMPRESSION_METHOD_NULL)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R, is_dtls: bool) -> Result<Self> {
        let major = reader.read_u8().map_err(Error::from)?;
        let minor = reader.read_u8().map_err(Error::from)?;
        let random = HandshakeRandom::unmarshal(reader)?;

        let session_id_len = reader.read_u8().map_err(Error::from)? as usize;
        let mut session_id = vec![0u8; session_id_len];
        reader.read_exact(&mut session_id).map_err(Error::from)?;

        let cookie = if is_dtls {
            let cookie_len = reader.read_u8().map_err(Error::from)? as usize;
            let mut cookie = vec![0u8; cookie_len];
            reader.read_exact(&mut cookie).map_err(Error::from)?;
            cookie
        } else {
            Vec::new()
        };

        let cipher_suites_len = reader.read_u16::<BigEndian>().map_err(Error::from)? as usize;
        if cipher_suites_len % 2 != 0 {
            return Err(Error::AlertDecodeError("odd cipher_suites length".into()));
        }
        let mut cipher_suites = Vec::with_capacity(cipher_suites_len / 2);
        for _ in 0..cipher_suites_len / 2 {
            cipher_suites.push(CipherSuiteId::from(
                reader.read_u16::<BigEndian>().map_err(Error::from)?,
            ));
        }

        let compression_len = reader.read_u8().map_err(Error::from)? as usize;
        let mut compression = vec![0u8; compression_len];
        reader.read_exact(&mut compression).map_err(Error::from)?;

        Ok(ClientHello {
            version: ProtocolVersion { major, minor },
            random,
            session_id,
            cookie,
            cipher_suites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_cookie() {
        let hello = ClientHello {
            version: ProtocolVersion::DTLS1_2,
            random: HandshakeRandom::default(),
            session_id: vec![],
            cookie: vec![1, 2, 3, 4],
            cipher_suites: vec![CipherSuiteId::PskWithAes128GcmSha256],
        };
        let mut buf = Vec::new();
        hello.marshal(&mut buf, true).unwrap();
        let parsed = ClientHello::unmarshal(&mut buf.as_slice(), true).unwrap();
        assert_eq!(parsed, hello);
    }

    #[test]
    fn tls_framing_omits_cookie() {
        let hello = ClientHello {
            version: ProtocolVersion::TLS1_2,
            random: HandshakeRandom::default(),
            session_id: vec![],
            cookie: vec![],
            cipher_suites: vec![CipherSuiteId::NullWithNullNull],
        };
        let mut buf = Vec::new();
        hello.marshal(&mut buf, false).unwrap();
        let parsed = ClientHello::unmarshal(&mut buf.as_slice(), false).unwrap();
        assert_eq!(parsed, hello);
    }
}
