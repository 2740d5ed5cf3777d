//! §4.7 DTLS cookie verification (RFC 6347 §4.2.1): lets a server answer
//! a ClientHello without committing per-connection state until the
//! client proves it owns the source address by echoing back an
//! HMAC-derived cookie.

use subtle::ConstantTimeEq;

use crate::crypto::CryptoProvider;
use crate::error::Result;
use crate::message::random::HandshakeRandom;

/// `secret` is a server-local key rotated independently of any single
/// connection; `client_identifier` is typically the source address, left
/// to the caller since this crate has no transport of its own.
pub fn generate_cookie(
    crypto: &dyn CryptoProvider,
    secret: &[u8],
    client_random: &HandshakeRandom,
    client_identifier: &[u8],
) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.extend_from_slice(&client_random.to_vec());
    data.extend_from_slice(client_identifier);
    crypto.hmac(crate::cipher_suite::CipherSuiteId::PskWithNullSha256, secret, &data)
}

pub fn verify_cookie(
    crypto: &dyn CryptoProvider,
    secret: &[u8],
    client_random: &HandshakeRandom,
    client_identifier: &[u8],
    presented: &[u8],
) -> Result<bool> {
    let expected = generate_cookie(crypto, secret, client_random, client_identifier)?;
    Ok(bool::from(expected.ct_eq(presented)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCryptoProvider;

    #[test]
    fn a_cookie_verifies_against_the_same_secret_and_random() {
        let crypto = DefaultCryptoProvider::new();
        let secret = vec![0x42; 32];
        let random = HandshakeRandom::default();
        let cookie = generate_cookie(&crypto, &secret, &random, &[]).unwrap();
        assert!(verify_cookie(&crypto, &secret, &random, &[], &cookie).unwrap());
    }

    #[test]
    fn a_cookie_fails_against_a_different_secret() {
        let crypto = DefaultCryptoProvider::new();
        let random = HandshakeRandom::default();
        let cookie = generate_cookie(&crypto, &vec![0x42; 32], &random, &[]).unwrap();
        assert!(!verify_cookie(&crypto, &vec![0x24; 32], &random, &[], &cookie).unwrap());
    }
}
