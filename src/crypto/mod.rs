//! Capability surface for the collaborators §1 calls out of scope: random
//! number generation, MAC/signature primitives and certificate-chain
//! validation. The handshake core calls through [`CryptoProvider`] and
//! never touches an RNG or a signature library directly.

mod default_provider;
pub mod prf;

pub use default_provider::DefaultCryptoProvider;
pub use prf::{key_expansion, master_secret, prf_psk_pre_master_secret, verify_data, PrfHash};

use crate::cipher_suite::CipherSuiteId;
use crate::error::Result;

/// A certificate chain as presented on the wire: a sequence of DER blobs,
/// leaf first. Validation semantics (trust anchors, revocation, name
/// checks) belong entirely to the implementer; this crate only carries
/// the bytes through the handshake.
pub type CertificateChain = Vec<Vec<u8>>;

/// A detached signature over the `CertificateVerify` transcript hash, or
/// over the `ServerKeyExchange` params, depending on the call site.
pub type Signature = Vec<u8>;

pub trait CryptoProvider: Send + Sync {
    /// Fill `buf` with cryptographically secure random bytes.
    fn fill_random(&self, buf: &mut [u8]) -> Result<()>;

    /// HMAC over `data` keyed by `key`, using the hash named by `suite`.
    fn hmac(&self, suite: CipherSuiteId, key: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Generate this side's ephemeral ECDHE key share for `ServerKeyExchange`
    /// / `ClientKeyExchange`, returning the encoded public point.
    fn generate_ecdhe_key_share(&self) -> Result<(Vec<u8>, EcdhePrivateKey)>;

    /// Complete an ECDHE exchange given the peer's encoded public point and
    /// our own ephemeral private key, producing the raw shared secret that
    /// feeds the pre-master secret (RFC 4492 §5.10).
    fn ecdhe_shared_secret(
        &self,
        private_key: &EcdhePrivateKey,
        peer_public: &[u8],
    ) -> Result<Vec<u8>>;

    /// Sign `message` (already hashed per the suite's signature-hash
    /// algorithm) with this endpoint's certificate key, for
    /// `CertificateVerify` or `ServerKeyExchange`.
    fn sign(&self, message: &[u8]) -> Result<Signature>;

    /// Verify `signature` over `message` using the public key carried by
    /// `certificate` (the leaf of a chain already structurally parsed by
    /// the caller).
    fn verify(&self, certificate: &[u8], message: &[u8], signature: &[u8]) -> Result<()>;

    /// Validate a full certificate chain against this endpoint's trust
    /// policy. A `CryptoAdapterFailure` here maps to a fatal
    /// `bad_certificate` / `certificate_unknown` alert up in the FSM.
    fn validate_certificate_chain(&self, chain: &CertificateChain) -> Result<()>;

    /// This endpoint's own certificate chain, leaf first, offered in a
    /// `Certificate` message. Empty when this side has none to offer.
    fn local_certificate_chain(&self) -> CertificateChain;
}

/// An opaque ephemeral ECDHE private key handle. Kept behind a newtype so
/// the handshake core never inspects key material directly; the provider
/// that created it is the only thing that can downcast and consume it
/// again in `ecdhe_shared_secret`.
pub struct EcdhePrivateKey(pub(crate) Box<dyn std::any::Any + Send>);
