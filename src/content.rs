//! RFC 4346 §6.2.1 record content types, and `ProtocolVersion`/record
//! header wire types shared between the TLS and DTLS framings.

#[derive(Default, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ContentType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22,
    ApplicationData = 23,
    #[default]
    Invalid,
}

impl From<u8> for ContentType {
    fn from(val: u8) -> Self {
        match val {
            20 => ContentType::ChangeCipherSpec,
            21 => ContentType::Alert,
            22 => ContentType::Handshake,
            23 => ContentType::ApplicationData,
            _ => ContentType::Invalid,
        }
    }
}

/// TLS/DTLS wire version. DTLS versions are the one's-complement of the
/// corresponding TLS version per RFC 6347 §4.1 (DTLS 1.2 is {254, 253}).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub const TLS1_2: ProtocolVersion = ProtocolVersion { major: 3, minor: 3 };
    pub const DTLS1_2: ProtocolVersion = ProtocolVersion {
        major: 0xfe,
        minor: 0xfd,
    };
}
