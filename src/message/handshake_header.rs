//! RFC 5246 §7.4 handshake header, extended by RFC 6347 §4.2.2 with the
//! DTLS fragment fields. TLS framing always has fragment_offset 0 and
//! fragment_length == length; DTLS may split a message across records.

use std::convert::TryFrom;
use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::HandshakeType;
use crate::error::{Error, Result};

pub const HANDSHAKE_HEADER_LENGTH: usize = 12;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct HandshakeHeader {
    pub handshake_type: HandshakeType,
    pub length: u32,            // 24-bit
    pub message_sequence: u16,  // DTLS only; 0 for TLS
    pub fragment_offset: u32,   // 24-bit, DTLS only
    pub fragment_length: u32,   // 24-bit
}

impl HandshakeHeader {
    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.handshake_type as u8)?;
        writer.write_u24::<BigEndian>(self.length)?;
        writer.write_u16::<BigEndian>(self.message_sequence)?;
        writer.write_u24::<BigEndian>(self.fragment_offset)?;
        writer.write_u24::<BigEndian>(self.fragment_length)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let handshake_type = HandshakeType::try_from(reader.read_u8().map_err(Error::from)?)?;
        let length = reader.read_u24::<BigEndian>().map_err(Error::from)?;
        let message_sequence = reader.read_u16::<BigEndian>().map_err(Error::from)?;
        let fragment_offset = reader.read_u24::<BigEndian>().map_err(Error::from)?;
        let fragment_length = reader.read_u24::<BigEndian>().map_err(Error::from)?;
        Ok(HandshakeHeader {
            handshake_type,
            length,
            message_sequence,
            fragment_offset,
            fragment_length,
        })
    }
}
