//! The cipher-suite support set named by §4.3, trimmed from the teacher's
//! much larger table down to the four IDs this spec recognizes.

use std::fmt;

use crate::error::{Error, Result};

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CipherSuiteId {
    /// Used before the first ChangeCipherSpec; carries no protection.
    NullWithNullNull = 0x0000,
    /// PSK key exchange, SHA-256 HMAC, no encryption.
    PskWithNullSha256 = 0x00b0,
    /// PSK key exchange, AEAD with a 128-bit key (RFC 5288 explicit nonce).
    PskWithAes128GcmSha256 = 0x00a8,
    /// Certificate-based key exchange, SHA-256 PRF, client-auth capable.
    EcdheRsaWithAes128GcmSha256 = 0xc02f,
    Unsupported,
}

impl fmt::Display for CipherSuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CipherSuiteId::*;
        let s = match self {
            NullWithNullNull => "TLS_NULL_WITH_NULL_NULL",
            PskWithNullSha256 => "TLS_PSK_WITH_NULL_SHA256",
            PskWithAes128GcmSha256 => "TLS_PSK_WITH_AES_128_GCM_SHA256",
            EcdheRsaWithAes128GcmSha256 => "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
            Unsupported => "Unsupported",
        };
        write!(f, "{s}")
    }
}

impl From<u16> for CipherSuiteId {
    fn from(val: u16) -> Self {
        use CipherSuiteId::*;
        match val {
            0x0000 => NullWithNullNull,
            0x00b0 => PskWithNullSha256,
            0x00a8 => PskWithAes128GcmSha256,
            0xc02f => EcdheRsaWithAes128GcmSha256,
            _ => Unsupported,
        }
    }
}

/// The PRF hash a suite uses (§4.5). Every suite this crate recognizes
/// uses SHA-256; SHA-384 is named by the spec for completeness of the
/// `CipherSuiteHash` type but no supported suite currently selects it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CipherSuiteHash {
    Sha256,
    Sha384,
}

impl CipherSuiteHash {
    pub fn output_len(&self) -> usize {
        match self {
            CipherSuiteHash::Sha256 => 32,
            CipherSuiteHash::Sha384 => 48,
        }
    }
}

/// Whether a cipher's bulk transform is a stream/block MAC-then-encrypt
/// construction or an AEAD (§3 "Security parameters").
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CipherType {
    Stream,
    Aead,
}

/// Per-suite sizes the record layer needs once parameters are installed.
/// These are opinions the handshake holds about a suite it negotiated;
/// the record layer is the one that actually uses them (out of scope).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CipherSuiteParams {
    pub id: CipherSuiteId,
    pub hash: CipherSuiteHash,
    pub cipher_type: CipherType,
    pub is_psk: bool,
    pub is_certificate: bool,
    pub mac_key_len: usize,
    pub enc_key_len: usize,
    pub fixed_iv_len: usize,
}

pub fn params_for_id(id: CipherSuiteId) -> Result<CipherSuiteParams> {
    use CipherSuiteId::*;
    let params = match id {
        NullWithNullNull => CipherSuiteParams {
            id,
            hash: CipherSuiteHash::Sha256,
            cipher_type: CipherType::Stream,
            is_psk: false,
            is_certificate: false,
            mac_key_len: 0,
            enc_key_len: 0,
            fixed_iv_len: 0,
        },
        PskWithNullSha256 => CipherSuiteParams {
            id,
            hash: CipherSuiteHash::Sha256,
            cipher_type: CipherType::Stream,
            is_psk: true,
            is_certificate: false,
            mac_key_len: 32,
            enc_key_len: 0,
            fixed_iv_len: 0,
        },
        PskWithAes128GcmSha256 => CipherSuiteParams {
            id,
            hash: CipherSuiteHash::Sha256,
            cipher_type: CipherType::Aead,
            is_psk: true,
            is_certificate: false,
            mac_key_len: 0,
            enc_key_len: 16,
            fixed_iv_len: 4,
        },
        EcdheRsaWithAes128GcmSha256 => CipherSuiteParams {
            id,
            hash: CipherSuiteHash::Sha256,
            cipher_type: CipherType::Aead,
            is_psk: false,
            is_certificate: true,
            mac_key_len: 0,
            enc_key_len: 16,
            fixed_iv_len: 4,
        },
        Unsupported => return Err(Error::AlertHandshakeFailure("unsupported cipher suite".into())),
    };
    Ok(params)
}

/// The maximum number of cipher suites a ClientHello may offer (§8
/// "Boundary behaviors").
pub const MAX_CIPHER_SUITES: usize = 10;

/// Negotiation rule (§4.3): the server picks the first suite it supports
/// from the client's preference-ordered list.
pub fn select_cipher_suite(
    client_suites: &[CipherSuiteId],
    server_supported: &[CipherSuiteId],
) -> Result<CipherSuiteId> {
    for id in client_suites {
        if server_supported.contains(id) {
            return Ok(*id);
        }
    }
    Err(Error::AlertHandshakeFailure(
        "no shared cipher suite".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_the_clients_first_mutually_supported_suite() {
        let client = vec![
            CipherSuiteId::EcdheRsaWithAes128GcmSha256,
            CipherSuiteId::PskWithAes128GcmSha256,
        ];
        let server = vec![CipherSuiteId::PskWithAes128GcmSha256];
        assert_eq!(
            select_cipher_suite(&client, &server).unwrap(),
            CipherSuiteId::PskWithAes128GcmSha256
        );
    }

    #[test]
    fn errors_when_no_suite_is_shared() {
        let client = vec![CipherSuiteId::PskWithNullSha256];
        let server = vec![CipherSuiteId::PskWithAes128GcmSha256];
        assert!(select_cipher_suite(&client, &server).is_err());
    }

    #[test]
    fn unrecognized_wire_values_decode_to_unsupported() {
        assert_eq!(CipherSuiteId::from(0x1234), CipherSuiteId::Unsupported);
        assert!(params_for_id(CipherSuiteId::Unsupported).is_err());
    }
}
