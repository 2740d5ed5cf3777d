//! Error taxonomy for the handshake core.
//!
//! Every fallible operation in this crate returns [`Result`]. The variants
//! map onto the taxonomy kinds named by the handshake specification: most
//! carry enough context to be surfaced verbatim to the application via
//! `on_disconnected`.

use std::io;

use thiserror::Error;

use crate::alert::{AlertDescription, AlertLevel};

pub type Result<T> = std::result::Result<T, Error>;

/// One taxonomy kind per the handshake specification's error design.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error("crypto adapter failure: {0}")]
    CryptoAdapterFailure(String),

    #[error("unexpected handshake message: {0}")]
    AlertUnexpectedMessage(String),

    #[error("handshake failure: {0}")]
    AlertHandshakeFailure(String),

    #[error("decrypt error: {0}")]
    AlertDecryptError(String),

    #[error("decode error: {0}")]
    AlertDecodeError(String),

    #[error("peer sent close_notify")]
    AlertCloseNotify,

    #[error("renegotiation rejected")]
    RenegotiationRejected,

    #[error("shared container corrupted: {0}")]
    ContainerCorrupted(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl Error {
    /// Whether this error is fatal to the connection (as opposed to an
    /// absorbed non-fatal condition such as a duplicate DTLS fragment).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::ContainerCorrupted(_))
    }

    /// Maps this error onto the (level, description) pair that should be
    /// sent on the wire before tearing the connection down, if any.
    /// `None` means no alert should be sent (e.g. the peer already told us
    /// they're leaving via close_notify).
    pub fn to_outbound_alert(&self) -> Option<(AlertLevel, AlertDescription)> {
        use Error::*;
        match self {
            AlertCloseNotify => None,
            AlertUnexpectedMessage(_) => Some((AlertLevel::Fatal, AlertDescription::UnexpectedMessage)),
            AlertHandshakeFailure(_) => Some((AlertLevel::Fatal, AlertDescription::HandshakeFailure)),
            AlertDecryptError(_) => Some((AlertLevel::Fatal, AlertDescription::DecryptError)),
            AlertDecodeError(_) => Some((AlertLevel::Fatal, AlertDescription::DecodeError)),
            RenegotiationRejected => Some((AlertLevel::Warning, AlertDescription::NoRenegotiation)),
            CryptoAdapterFailure(_) => Some((AlertLevel::Fatal, AlertDescription::InternalError)),
            Internal(_) => Some((AlertLevel::Fatal, AlertDescription::InternalError)),
            InvalidArgument(_) | InvalidState(_) | ContainerCorrupted(_) | Io(_) => {
                Some((AlertLevel::Fatal, AlertDescription::InternalError))
            }
        }
    }

    /// The stable code reported to the application alongside the
    /// human-readable description in `on_disconnected`.
    pub fn code(&self) -> &'static str {
        use Error::*;
        match self {
            InvalidArgument(_) => "InvalidArgument",
            InvalidState(_) => "InvalidState",
            Internal(_) => "Internal",
            CryptoAdapterFailure(_) => "CryptoAdapterFailure",
            AlertUnexpectedMessage(_) => "AlertUnexpectedMessage",
            AlertHandshakeFailure(_) => "AlertHandshakeFailure",
            AlertDecryptError(_) => "AlertDecryptError",
            AlertDecodeError(_) => "AlertDecodeError",
            AlertCloseNotify => "AlertCloseNotify",
            RenegotiationRejected => "RenegotiationRejected",
            ContainerCorrupted(_) => "ContainerCorrupted",
            Io(_) => "Io",
        }
    }
}
