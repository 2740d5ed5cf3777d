//! The record-layer boundary: §1 names this an external collaborator.
//! This module defines only the wire header the aggregator must parse to
//! find handshake bytes, and the trait surface the handshake pushes
//! into / is called back from (§6 "Downward interface to record layer").
//! Fragmentation, MAC, encryption and the replay window live on the other
//! side of [`RecordLayer`] and are out of scope here.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cipher_suite::CipherSuiteId;
use crate::content::{ContentType, ProtocolVersion};
use crate::error::{Error, Result};
use crate::message::random::HandshakeRandom;

pub const RECORD_LAYER_HEADER_SIZE_TLS: usize = 5;
pub const RECORD_LAYER_HEADER_SIZE_DTLS: usize = 13;

/// One record header, in either its TLS (stream) or DTLS (datagram) shape.
/// DTLS adds a 2-byte epoch and 6-byte sequence number between the version
/// and the length (RFC 6347 §4.1).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RecordLayerHeader {
    pub content_type: ContentType,
    pub version: ProtocolVersion,
    pub epoch: u16,
    pub sequence_number: u64, // 48-bit on the wire
    pub content_len: u16,
}

impl RecordLayerHeader {
    pub fn marshal<W: Write>(&self, writer: &mut W, is_dtls: bool) -> Result<()> {
        writer.write_u8(self.content_type as u8)?;
        writer.write_u8(self.version.major)?;
        writer.write_u8(self.version.minor)?;
        if is_dtls {
            writer.write_u16::<BigEndian>(self.epoch)?;
            writer.write_u48::<BigEndian>(self.sequence_number)?;
        }
        writer.write_u16::<BigEndian>(self.content_len)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R, is_dtls: bool) -> Result<Self> {
        let content_type = reader.read_u8().map_err(Error::from)?.into();
        let major = reader.read_u8().map_err(Error::from)?;
        let minor = reader.read_u8().map_err(Error::from)?;
        let (epoch, sequence_number) = if is_dtls {
            let epoch = reader.read_u16::<BigEndian>().map_err(Error::from)?;
            let seq = reader.read_u48::<BigEndian>().map_err(Error::from)?;
            (epoch, seq)
        } else {
            (0, 0)
        };
        let content_len = reader.read_u16::<BigEndian>().map_err(Error::from)?;
        Ok(RecordLayerHeader {
            content_type,
            version: ProtocolVersion { major, minor },
            epoch,
            sequence_number,
            content_len,
        })
    }

    pub fn size(is_dtls: bool) -> usize {
        if is_dtls {
            RECORD_LAYER_HEADER_SIZE_DTLS
        } else {
            RECORD_LAYER_HEADER_SIZE_TLS
        }
    }
}

/// Keying material negotiated but not yet committed to the record layer
/// ("Security parameters (next)", §3). Constructed incrementally during
/// the handshake and installed at the ChangeCipherSpec boundary.
#[derive(Clone)]
pub struct SecurityParameters {
    pub cipher_suite: CipherSuiteId,
    pub is_client: bool,
    pub client_random: HandshakeRandom,
    pub server_random: HandshakeRandom,
    pub master_secret: Vec<u8>,
    pub psk_identity_hint: Vec<u8>,
}

impl SecurityParameters {
    pub fn new(is_client: bool) -> Self {
        SecurityParameters {
            cipher_suite: CipherSuiteId::NullWithNullNull,
            is_client,
            client_random: HandshakeRandom::default(),
            server_random: HandshakeRandom::default(),
            master_secret: Vec::new(),
            psk_identity_hint: Vec::new(),
        }
    }
}

/// The downward interface to the record layer (§6). An implementation
/// owns fragmentation, MAC, AEAD, and the replay window; none of that is
/// modeled here.
pub trait RecordLayer {
    /// Enqueue one record of the given content type for transmission.
    fn send(&mut self, content_type: ContentType, payload: &[u8]) -> Result<()>;

    /// Activate `params` for the outbound direction. Called once per
    /// ChangeCipherSpec sent.
    fn install_write_security_parameters(&mut self, params: SecurityParameters) -> Result<()>;

    /// Activate `params` for the inbound direction. Called once per
    /// ChangeCipherSpec received.
    fn install_read_security_parameters(&mut self, params: SecurityParameters) -> Result<()>;

    /// Stop processing records; the connection is being torn down.
    fn disconnect(&mut self);
}
