//! A reference [`CryptoProvider`] backing the test suite. Production
//! embedders are expected to supply their own, typically backed by a
//! platform crypto module; this one exists so the state machine can be
//! exercised end-to-end without one.

use hmac::{Hmac, Mac};
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand_core::OsRng;
use sha2::Sha256;
use signature::{Signer, Verifier};

use crate::cipher_suite::CipherSuiteId;
use crate::error::{Error, Result};

use super::{CertificateChain, CryptoProvider, EcdhePrivateKey, Signature};

pub struct DefaultCryptoProvider {
    signing_key: Option<p256::ecdsa::SigningKey>,
    certificate_chain: CertificateChain,
}

impl DefaultCryptoProvider {
    pub fn new() -> Self {
        DefaultCryptoProvider {
            signing_key: None,
            certificate_chain: Vec::new(),
        }
    }

    /// Configure this endpoint to present a certificate and sign with the
    /// matching key (server role in `EcdheRsaWithAes128GcmSha256`, or any
    /// role doing client-cert auth).
    pub fn with_identity(mut self, signing_key: p256::ecdsa::SigningKey, chain: CertificateChain) -> Self {
        self.signing_key = Some(signing_key);
        self.certificate_chain = chain;
        self
    }
}

impl Default for DefaultCryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoProvider for DefaultCryptoProvider {
    fn fill_random(&self, buf: &mut [u8]) -> Result<()> {
        use rand_core::RngCore;
        OsRng.fill_bytes(buf);
        Ok(())
    }

    fn hmac(&self, suite: CipherSuiteId, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let _ = suite; // every supported suite currently uses SHA-256
        let mut mac = Hmac::<Sha256>::new_from_slice(key)
            .map_err(|e| Error::CryptoAdapterFailure(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn generate_ecdhe_key_share(&self) -> Result<(Vec<u8>, EcdhePrivateKey)> {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public = secret.public_key();
        let encoded = public.to_encoded_point(false).as_bytes().to_vec();
        Ok((encoded, EcdhePrivateKey(Box::new(secret))))
    }

    fn ecdhe_shared_secret(&self, private_key: &EcdhePrivateKey, peer_public: &[u8]) -> Result<Vec<u8>> {
        let peer = PublicKey::from_sec1_bytes(peer_public)
            .map_err(|e| Error::AlertDecodeError(format!("invalid ECDHE public point: {e}")))?;
        let secret = private_key
            .0
            .downcast_ref::<EphemeralSecret>()
            .ok_or_else(|| Error::Internal("ECDHE key handle from a different provider".into()))?;
        let shared = secret.diffie_hellman(&peer);
        Ok(shared.raw_secret_bytes().to_vec())
    }

    fn sign(&self, message: &[u8]) -> Result<Signature> {
        let key = self
            .signing_key
            .as_ref()
            .ok_or_else(|| Error::CryptoAdapterFailure("no local signing key configured".into()))?;
        let sig: p256::ecdsa::Signature = key.sign(message);
        Ok(sig.to_der().as_bytes().to_vec())
    }

    fn verify(&self, certificate: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
        let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(certificate)
            .map_err(|e| Error::AlertDecodeError(format!("invalid certificate public key: {e}")))?;
        let sig = p256::ecdsa::Signature::from_der(signature)
            .map_err(|e| Error::AlertDecodeError(format!("invalid signature encoding: {e}")))?;
        verifying_key
            .verify(message, &sig)
            .map_err(|_| Error::AlertHandshakeFailure("signature verification failed".into()))
    }

    fn validate_certificate_chain(&self, chain: &CertificateChain) -> Result<()> {
        if chain.is_empty() {
            return Err(Error::AlertHandshakeFailure("empty certificate chain".into()));
        }
        Ok(())
    }

    fn local_certificate_chain(&self) -> CertificateChain {
        self.certificate_chain.clone()
    }
}
