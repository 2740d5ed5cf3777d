//! Wire-level handshake message types (RFC 5246 §7.4). [`Handshake`] is
//! the envelope the aggregator hands to the [`crate::message_manager`];
//! [`HandshakeMessage`] is the decoded union every state inspects.

pub mod certificate;
pub mod certificate_request;
pub mod certificate_verify;
pub mod client_hello;
pub mod client_key_exchange;
pub mod finished;
pub mod handshake_header;
pub mod hello_request;
pub mod hello_verify_request;
pub mod random;
pub mod server_hello;
pub mod server_hello_done;
pub mod server_key_exchange;

use std::convert::TryFrom;
use std::io::{Read, Write};

use self::certificate::Certificate;
use self::certificate_request::CertificateRequest;
use self::certificate_verify::CertificateVerify;
use self::client_hello::ClientHello;
use self::client_key_exchange::ClientKeyExchange;
use self::finished::Finished;
use self::handshake_header::{HandshakeHeader, HANDSHAKE_HEADER_LENGTH};
use self::hello_request::HelloRequest;
use self::hello_verify_request::HelloVerifyRequest;
use self::server_hello::ServerHello;
use self::server_hello_done::ServerHelloDone;
use self::server_key_exchange::ServerKeyExchange;
use crate::error::{Error, Result};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HandshakeType {
    HelloRequest = 0,
    ClientHello = 1,
    ServerHello = 2,
    HelloVerifyRequest = 3,
    Certificate = 11,
    ServerKeyExchange = 12,
    CertificateRequest = 13,
    ServerHelloDone = 14,
    CertificateVerify = 15,
    ClientKeyExchange = 16,
    Finished = 20,
}

impl TryFrom<u8> for HandshakeType {
    type Error = Error;

    fn try_from(val: u8) -> Result<Self> {
        use HandshakeType::*;
        Ok(match val {
            0 => HelloRequest,
            1 => ClientHello,
            2 => ServerHello,
            3 => HelloVerifyRequest,
            11 => Certificate,
            12 => ServerKeyExchange,
            13 => CertificateRequest,
            14 => ServerHelloDone,
            15 => CertificateVerify,
            16 => ClientKeyExchange,
            20 => Finished,
            other => {
                return Err(Error::AlertDecodeError(format!(
                    "unknown handshake type {other}"
                )))
            }
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HandshakeMessage {
    HelloRequest(HelloRequest),
    ClientHello(ClientHello),
    ServerHello(ServerHello),
    HelloVerifyRequest(HelloVerifyRequest),
    Certificate(Certificate),
    ServerKeyExchange(ServerKeyExchange),
    CertificateRequest(CertificateRequest),
    ServerHelloDone(ServerHelloDone),
    CertificateVerify(CertificateVerify),
    ClientKeyExchange(ClientKeyExchange),
    Finished(Finished),
}

impl HandshakeMessage {
    pub fn handshake_type(&self) -> HandshakeType {
        use HandshakeMessage::*;
        match self {
            HelloRequest(_) => HandshakeType::HelloRequest,
            ClientHello(_) => HandshakeType::ClientHello,
            ServerHello(_) => HandshakeType::ServerHello,
            HelloVerifyRequest(_) => HandshakeType::HelloVerifyRequest,
            Certificate(_) => HandshakeType::Certificate,
            ServerKeyExchange(_) => HandshakeType::ServerKeyExchange,
            CertificateRequest(_) => HandshakeType::CertificateRequest,
            ServerHelloDone(_) => HandshakeType::ServerHelloDone,
            CertificateVerify(_) => HandshakeType::CertificateVerify,
            ClientKeyExchange(_) => HandshakeType::ClientKeyExchange,
            Finished(_) => HandshakeType::Finished,
        }
    }

    pub fn marshal_body<W: Write>(&self, writer: &mut W, is_dtls: bool) -> Result<()> {
        use HandshakeMessage::*;
        match self {
            HelloRequest(m) => m.marshal(writer),
            ClientHello(m) => m.marshal(writer, is_dtls),
            ServerHello(m) => m.marshal(writer),
            HelloVerifyRequest(m) => m.marshal(writer),
            Certificate(m) => m.marshal(writer),
            ServerKeyExchange(m) => m.marshal(writer),
            CertificateRequest(m) => m.marshal(writer),
            ServerHelloDone(m) => m.marshal(writer),
            CertificateVerify(m) => m.marshal(writer),
            ClientKeyExchange(m) => m.marshal(writer),
            Finished(m) => m.marshal(writer),
        }
    }

    /// Parsing a `ClientKeyExchange` needs to know whether the negotiated
    /// suite is PSK or ECDHE, which the generic decode path doesn't have;
    /// callers that expect that type should match on [`HandshakeType`]
    /// first and call `ClientKeyExchange::unmarshal` directly.
    pub fn unmarshal_body<R: Read>(
        handshake_type: HandshakeType,
        reader: &mut R,
        is_dtls: bool,
        is_psk: bool,
    ) -> Result<Self> {
        use HandshakeType::*;
        Ok(match handshake_type {
            HelloRequest => HandshakeMessage::HelloRequest(self::hello_request::HelloRequest::unmarshal(reader)?),
            ClientHello => HandshakeMessage::ClientHello(self::client_hello::ClientHello::unmarshal(reader, is_dtls)?),
            ServerHello => HandshakeMessage::ServerHello(self::server_hello::ServerHello::unmarshal(reader)?),
            HelloVerifyRequest => {
                HandshakeMessage::HelloVerifyRequest(self::hello_verify_request::HelloVerifyRequest::unmarshal(reader)?)
            }
            Certificate => HandshakeMessage::Certificate(self::certificate::Certificate::unmarshal(reader)?),
            ServerKeyExchange => {
                HandshakeMessage::ServerKeyExchange(self::server_key_exchange::ServerKeyExchange::unmarshal(reader)?)
            }
            CertificateRequest => {
                HandshakeMessage::CertificateRequest(self::certificate_request::CertificateRequest::unmarshal(reader)?)
            }
            ServerHelloDone => HandshakeMessage::ServerHelloDone(self::server_hello_done::ServerHelloDone::unmarshal(reader)?),
            CertificateVerify => {
                HandshakeMessage::CertificateVerify(self::certificate_verify::CertificateVerify::unmarshal(reader)?)
            }
            ClientKeyExchange => {
                HandshakeMessage::ClientKeyExchange(self::client_key_exchange::ClientKeyExchange::unmarshal(
                    reader, is_psk,
                )?)
            }
            Finished => HandshakeMessage::Finished(self::finished::Finished::unmarshal(reader)?),
        })
    }
}

/// One complete handshake message: header plus body, as it travels inside
/// a single `ContentType::Handshake` record (or, in DTLS, is reassembled
/// from one or more fragments of such records).
#[derive(Clone, Debug, PartialEq)]
pub struct Handshake {
    pub header: HandshakeHeader,
    pub message: HandshakeMessage,
}

impl Handshake {
    pub fn new(message: HandshakeMessage, message_sequence: u16, is_dtls: bool) -> Result<Self> {
        let mut body = Vec::new();
        message.marshal_body(&mut body, is_dtls)?;
        let length = body.len() as u32;
        Ok(Handshake {
            header: HandshakeHeader {
                handshake_type: message.handshake_type(),
                length,
                message_sequence,
                fragment_offset: 0,
                fragment_length: length,
            },
            message,
        })
    }

    pub fn marshal<W: Write>(&self, writer: &mut W, is_dtls: bool) -> Result<()> {
        self.header.marshal(writer)?;
        self.message.marshal_body(writer, is_dtls)?;
        Ok(())
    }

    /// Parses one non-fragmented handshake message (already reassembled,
    /// in the DTLS case) out of `raw`, which must contain exactly one
    /// header plus body.
    pub fn unmarshal(raw: &[u8], is_dtls: bool, is_psk: bool) -> Result<Self> {
        if raw.len() < HANDSHAKE_HEADER_LENGTH {
            return Err(Error::AlertDecodeError("handshake message too short".into()));
        }
        let mut reader = raw;
        let header = HandshakeHeader::unmarshal(&mut reader)?;
        if header.fragment_offset != 0 || header.fragment_length != header.length {
            return Err(Error::Internal(
                "fragment reassembly must complete before Handshake::unmarshal".into(),
            ));
        }
        let message =
            HandshakeMessage::unmarshal_body(header.handshake_type, &mut reader, is_dtls, is_psk)?;
        Ok(Handshake { header, message })
    }
}
