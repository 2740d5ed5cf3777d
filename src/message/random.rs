//! RFC 5246 §7.4.1.2 `Random`: a 4-byte timestamp plus 28 bytes from the
//! peer's RNG, echoed back in the transcript and folded into the PRF.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::crypto::CryptoProvider;
use crate::error::{Error, Result};

pub const RANDOM_BYTES_LENGTH: usize = 28;
pub const HANDSHAKE_RANDOM_LENGTH: usize = 4 + RANDOM_BYTES_LENGTH;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct HandshakeRandom {
    pub gmt_unix_time: u32,
    pub random_bytes: [u8; RANDOM_BYTES_LENGTH],
}

impl Default for HandshakeRandom {
    fn default() -> Self {
        HandshakeRandom {
            gmt_unix_time: 0,
            random_bytes: [0u8; RANDOM_BYTES_LENGTH],
        }
    }
}

impl HandshakeRandom {
    /// Generate a fresh random with the current time per RFC 5246's
    /// `gmt_unix_time` convention, using `now` supplied by the caller
    /// (the FSM, which holds the only clock this crate reads).
    pub fn generate(crypto: &dyn CryptoProvider, gmt_unix_time: u32) -> Result<Self> {
        let mut random_bytes = [0u8; RANDOM_BYTES_LENGTH];
        crypto.fill_random(&mut random_bytes)?;
        Ok(HandshakeRandom {
            gmt_unix_time,
            random_bytes,
        })
    }

    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<BigEndian>(self.gmt_unix_time)?;
        writer.write_all(&self.random_bytes)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let gmt_unix_time = reader.read_u32::<BigEndian>().map_err(Error::from)?;
        let mut random_bytes = [0u8; RANDOM_BYTES_LENGTH];
        reader.read_exact(&mut random_bytes).map_err(Error::from)?;
        Ok(HandshakeRandom {
            gmt_unix_time,
            random_bytes,
        })
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HANDSHAKE_RANDOM_LENGTH);
        buf.extend_from_slice(&self.gmt_unix_time.to_be_bytes());
        buf.extend_from_slice(&self.random_bytes);
        buf
    }
}
