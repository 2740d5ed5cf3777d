//! RFC 5246 §7.1: a single-byte record signalling a ciphering-strategy
//! transition. Not a handshake message — excluded from the transcript.

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::content::ContentType;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct ChangeCipherSpec;

impl ChangeCipherSpec {
    pub fn content_type(&self) -> ContentType {
        ContentType::ChangeCipherSpec
    }

    pub fn size(&self) -> usize {
        1
    }

    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(0x01)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let b = reader.read_u8().map_err(Error::from)?;
        if b != 0x01 {
            return Err(Error::AlertDecodeError(
                "change_cipher_spec byte must be 0x01".into(),
            ));
        }
        Ok(ChangeCipherSpec)
    }
}
