//! RFC 5246 §7.4.1.3.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cipher_suite::CipherSuiteId;
use crate::content::ProtocolVersion;
use crate::error::{Error, Result};
use crate::message::random::HandshakeRandom;

const COMPRESSION_METHOD_NULL: u8 = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerHello {
    pub version: ProtocolVersion,
    pub random: HandshakeRandom,
    pub session_id: Vec<u8>,
    pub cipher_suite: CipherSuiteId,
}

impl ServerHello {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.version.major)?;
        writer.write_u8(self.version.minor)?;
        self.random.marshal(writer)?;
        writer.write_u8(self.session_id.len() as u8)?;
        writer.write_all(&self.session_id)?;
        writer.write_u16::<BigEndian>(self.cipher_suite as u16)?;
        writer.write_u8(COMPRESSION_METHOD_NULL)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let major = reader.read_u8().map_err(Error::from)?;
        let minor = reader.read_u8().map_err(Error::from)?;
        let random = HandshakeRandom::unmarshal(reader)?;

        let session_id_len = reader.read_u8().map_err(Error::from)? as usize;
        let mut session_id = vec![0u8; session_id_len];
        reader.read_exact(&mut session_id).map_err(Error::from)?;

        let cipher_suite = CipherSuiteId::from(reader.read_u16::<BigEndian>().map_err(Error::from)?);
        let compression = reader.read_u8().map_err(Error::from)?;
        if compression != COMPRESSION_METHOD_NULL {
            return Err(Error::AlertHandshakeFailure(
                "only the null compression method is supported".into(),
            ));
        }

        Ok(ServerHello {
            version: ProtocolVersion { major, minor },
            random,
            session_id,
            cipher_suite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let hello = ServerHello {
            version: ProtocolVersion::DTLS1_2,
            random: HandshakeRandom::default(),
            session_id: vec![1, 2, 3],
            cipher_suite: CipherSuiteId::PskWithAes128GcmSha256,
        };
        let mut buf = Vec::new();
        hello.marshal(&mut buf).unwrap();
        let parsed = ServerHello::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, hello);
    }

    #[test]
    fn rejects_non_null_compression_method() {
        let hello = ServerHello {
            version: ProtocolVersion::DTLS1_2,
            random: HandshakeRandom::default(),
            session_id: vec![],
            cipher_suite: CipherSuiteId::PskWithAes128GcmSha256,
        };
        let mut buf = Vec::new();
        hello.marshal(&mut buf).unwrap();
        let last = buf.len() - 1;
        buf[last] = 1;
        let err = ServerHello::unmarshal(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::AlertHandshakeFailure(_)));
    }
}
