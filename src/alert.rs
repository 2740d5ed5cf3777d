//! RFC 5246 §7.2 alert records: two bytes, level then description.

use std::fmt;
use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::content::ContentType;
use crate::error::{Error, Result};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AlertLevel {
    Warning = 1,
    Fatal = 2,
    Invalid,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Fatal => write!(f, "fatal"),
            AlertLevel::Invalid => write!(f, "invalid"),
        }
    }
}

impl From<u8> for AlertLevel {
    fn from(val: u8) -> Self {
        match val {
            1 => AlertLevel::Warning,
            2 => AlertLevel::Fatal,
            _ => AlertLevel::Invalid,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AlertDescription {
    CloseNotify = 0,
    UnexpectedMessage = 10,
    BadRecordMac = 20,
    DecryptionFailed = 21,
    RecordOverflow = 22,
    DecompressionFailure = 30,
    HandshakeFailure = 40,
    NoCertificate = 41,
    BadCertificate = 42,
    UnsupportedCertificate = 43,
    CertificateRevoked = 44,
    CertificateExpired = 45,
    CertificateUnknown = 46,
    IllegalParameter = 47,
    UnknownCa = 48,
    AccessDenied = 49,
    DecodeError = 50,
    DecryptError = 51,
    ProtocolVersion = 70,
    InsufficientSecurity = 71,
    InternalError = 80,
    UserCanceled = 90,
    NoRenegotiation = 100,
    UnsupportedExtension = 110,
    UnknownPskIdentity = 115,
    Invalid,
}

impl fmt::Display for AlertDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<u8> for AlertDescription {
    fn from(val: u8) -> Self {
        use AlertDescription::*;
        match val {
            0 => CloseNotify,
            10 => UnexpectedMessage,
            20 => BadRecordMac,
            21 => DecryptionFailed,
            22 => RecordOverflow,
            30 => DecompressionFailure,
            40 => HandshakeFailure,
            41 => NoCertificate,
            42 => BadCertificate,
            43 => UnsupportedCertificate,
            44 => CertificateRevoked,
            45 => CertificateExpired,
            46 => CertificateUnknown,
            47 => IllegalParameter,
            48 => UnknownCa,
            49 => AccessDenied,
            50 => DecodeError,
            51 => DecryptError,
            70 => ProtocolVersion,
            71 => InsufficientSecurity,
            80 => InternalError,
            90 => UserCanceled,
            100 => NoRenegotiation,
            110 => UnsupportedExtension,
            115 => UnknownPskIdentity,
            _ => Invalid,
        }
    }
}

/// A decoded alert record. `close_notify` (warning level) is graceful peer
/// close; any fatal alert terminates the connection.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Alert {
    pub level: AlertLevel,
    pub description: AlertDescription,
}

impl Alert {
    pub fn content_type(&self) -> ContentType {
        ContentType::Alert
    }

    pub fn size(&self) -> usize {
        2
    }

    pub fn marshal<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.level as u8)?;
        writer.write_u8(self.description as u8)?;
        Ok(())
    }

    pub fn unmarshal<R: Read>(reader: &mut R) -> Result<Self> {
        let level = reader.read_u8().map_err(Error::from)?.into();
        let description = reader.read_u8().map_err(Error::from)?.into();
        Ok(Alert { level, description })
    }

    /// Translates a wire alert into the crate's error taxonomy, per §4.3's
    /// "alert-reception helper common to all states".
    pub fn to_error(self) -> Error {
        if self.level == AlertLevel::Warning && self.description == AlertDescription::CloseNotify {
            return Error::AlertCloseNotify;
        }
        Error::AlertHandshakeFailure(format!(
            "peer alert: {} {}",
            self.level, self.description
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let alert = Alert {
            level: AlertLevel::Fatal,
            description: AlertDescription::HandshakeFailure,
        };
        let mut buf = Vec::new();
        alert.marshal(&mut buf).unwrap();
        assert_eq!(buf.len(), alert.size());
        let parsed = Alert::unmarshal(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, alert);
    }

    #[test]
    fn close_notify_maps_to_the_graceful_close_error() {
        let alert = Alert {
            level: AlertLevel::Warning,
            description: AlertDescription::CloseNotify,
        };
        assert!(matches!(alert.to_error(), Error::AlertCloseNotify));
    }

    #[test]
    fn any_fatal_alert_maps_to_a_handshake_failure_error() {
        let alert = Alert {
            level: AlertLevel::Fatal,
            description: AlertDescription::BadRecordMac,
        };
        assert!(matches!(alert.to_error(), Error::AlertHandshakeFailure(_)));
    }
}
