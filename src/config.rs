//! Endpoint configuration, grounded on the teacher's `config.rs` +
//! `validate_config`, generalized to the reduced cipher-suite set and the
//! PSK/certificate identity material this spec carries (§3).

use std::sync::Arc;
use std::time::Duration;

use crate::cipher_suite::CipherSuiteId;
use crate::crypto::CryptoProvider;
use crate::error::{Error, Result};

/// DTLS retransmission defaults (§4.6: one-shot timer, 5s default, 5
/// retries, 240s Connected retention).
pub const DEFAULT_RETRANSMIT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRANSMIT_RETRIES: u32 = 5;
pub const DEFAULT_CONNECTED_RETENTION: Duration = Duration::from_secs(240);

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Transport {
    Tls,
    Dtls,
}

/// Identity material an endpoint may present. A server or client can
/// carry either, both, or neither (an empty `NullWithNullNull`-only
/// config), depending on which cipher suites it is willing to negotiate.
#[derive(Clone, Default)]
pub struct Identity {
    pub psk: Option<Vec<u8>>,
    pub psk_identity_hint: Vec<u8>,
}

pub struct Config {
    pub transport: Transport,
    pub is_client: bool,
    pub supported_cipher_suites: Vec<CipherSuiteId>,
    pub identity: Identity,
    pub crypto: Arc<dyn CryptoProvider>,
    pub retransmit_interval: Duration,
    pub retransmit_retries: u32,
    pub connected_retention: Duration,
    pub extended_master_secret: bool,
    /// §4.7: a DTLS server issues a `HelloVerifyRequest` stateless cookie
    /// challenge before committing any per-connection state. Off by
    /// default; only meaningful for a server-side `Config`.
    pub cookie_verification_is_on: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.supported_cipher_suites.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one cipher suite must be supported".into(),
            ));
        }
        if self.supported_cipher_suites.len() > crate::cipher_suite::MAX_CIPHER_SUITES {
            return Err(Error::InvalidArgument(format!(
                "at most {} cipher suites may be offered",
                crate::cipher_suite::MAX_CIPHER_SUITES
            )));
        }
        for suite in &self.supported_cipher_suites {
            crate::cipher_suite::params_for_id(*suite)?;
        }
        if self.retransmit_retries == 0 && self.transport == Transport::Dtls {
            return Err(Error::InvalidArgument(
                "dtls requires at least one retransmit attempt".into(),
            ));
        }
        Ok(())
    }

    pub fn is_dtls(&self) -> bool {
        self.transport == Transport::Dtls
    }
}
