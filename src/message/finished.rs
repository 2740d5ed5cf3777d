//! RFC 5246 §7.4.9: the 12-byte PRF output proving both sides agree on
//! the transcript and the derived master secret.

use std::io::{Read, Write};

use crate::crypto::prf::VERIFY_DATA_LENGTH;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Finished {
    pub verify_data: [u8; VERIFY_DATA_LENGTH],
}

impl Finished {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.verify_data)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let mut verify_data = [0u8; VERIFY_DATA_LENGTH];
        reader.read_exact(&mut verify_data).map_err(Error::from)?;
        Ok(Finished { verify_data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_verify_data() {
        let finished = Finished {
            verify_data: [7u8; VERIFY_DATA_LENGTH],
        };
        let mut buf = Vec::new();
        finished.marshal(&mut buf).unwrap();
        assert_eq!(buf.len(), VERIFY_DATA_LENGTH);
        let parsed = Finished::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, finished);
    }
}
