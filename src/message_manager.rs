//! §4.1 MessageManager: a flat container holding one instance per
//! handshake message kind, tracking which ones are part of the running
//! transcript. Grounded on the teacher's `handshake_cache.rs`, which
//! keeps an append-only `Vec<HandshakeCacheItem>` keyed by
//! (type, is_client); this version instead keeps one slot per kind since
//! the spec's FSM only ever needs the latest copy of each message, not a
//! replay log.

use crate::message::handshake_header::HANDSHAKE_HEADER_LENGTH;
use crate::message::{Handshake, HandshakeMessage, HandshakeType};

#[derive(Default)]
struct Slot {
    handshake: Option<Handshake>,
    included: bool,
}

/// Internal transcript slot identity. Distinct from the wire
/// [`HandshakeType`]: a certificate-suite handshake with client auth
/// carries *two* `Certificate` messages (the server's and the client's,
/// §4.1), which must occupy separate slots or the second recorded
/// silently overwrites the first and drops out of the transcript used
/// for `CertificateVerify` signing and `Finished.verify_data`.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum SlotKind {
    HelloRequest,
    ClientHello,
    ServerHello,
    HelloVerifyRequest,
    ServerCertificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    ClientCertificate,
    ClientKeyExchange,
    CertificateVerify,
    Finished,
}

const NUM_SLOTS: usize = 12;

/// RFC 5246 §7.4's canonical message ordering ("...optional Certificate,
/// optional ServerKeyExchange, optional CertificateRequest,
/// ServerHelloDone, optional client Certificate, ClientKeyExchange,
/// optional CertificateVerify, Finished", §7.4.3: CertificateVerify signs
/// over the transcript including ClientKeyExchange, so it must follow
/// it), used both to decide when a flight is complete and to serialize
/// the transcript for the PRF.
const TRANSCRIPT_ORDER: &[SlotKind] = &[
    SlotKind::ClientHello,
    SlotKind::ServerHello,
    SlotKind::ServerCertificate,
    SlotKind::ServerKeyExchange,
    SlotKind::CertificateRequest,
    SlotKind::ServerHelloDone,
    SlotKind::ClientCertificate,
    SlotKind::ClientKeyExchange,
    SlotKind::CertificateVerify,
    SlotKind::Finished,
];

pub struct MessageManager {
    slots: [Slot; NUM_SLOTS],
}

fn slot_index(kind: SlotKind) -> usize {
    kind as usize
}

/// Maps a wire `HandshakeType` onto its transcript slot. `Certificate`
/// defaults to the server's slot, since every existing caller that looks
/// a `Certificate` up by wire type (e.g. the client verifying the
/// server's `ServerKeyExchange` signature) means the server's
/// certificate. The client's own certificate is recorded separately via
/// [`MessageManager::record_client_certificate`].
fn default_slot_for(t: HandshakeType) -> SlotKind {
    use HandshakeType::*;
    match t {
        HelloRequest => SlotKind::HelloRequest,
        ClientHello => SlotKind::ClientHello,
        ServerHello => SlotKind::ServerHello,
        HelloVerifyRequest => SlotKind::HelloVerifyRequest,
        Certificate => SlotKind::ServerCertificate,
        ServerKeyExchange => SlotKind::ServerKeyExchange,
        CertificateRequest => SlotKind::CertificateRequest,
        ServerHelloDone => SlotKind::ServerHelloDone,
        CertificateVerify => SlotKind::CertificateVerify,
        ClientKeyExchange => SlotKind::ClientKeyExchange,
        Finished => SlotKind::Finished,
    }
}

impl Default for MessageManager {
    fn default() -> Self {
        MessageManager {
            slots: Default::default(),
        }
    }
}

impl MessageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handshake`, marking it part of the transcript unless it is
    /// `HelloRequest` or `HelloVerifyRequest`, neither of which RFC 5246
    /// §7.4 / RFC 6347 §4.2.1 include in any Finished computation.
    pub fn record(&mut self, handshake: Handshake) {
        let kind = handshake.message.handshake_type();
        self.record_into(default_slot_for(kind), handshake);
    }

    /// Like [`Self::record`], but for the client's own `Certificate`
    /// message (client-auth), which must not collide with the server's
    /// `Certificate` slot.
    pub fn record_client_certificate(&mut self, handshake: Handshake) {
        self.record_into(SlotKind::ClientCertificate, handshake);
    }

    fn record_into(&mut self, slot_kind: SlotKind, handshake: Handshake) {
        let kind = handshake.message.handshake_type();
        let included = !matches!(
            kind,
            HandshakeType::HelloRequest | HandshakeType::HelloVerifyRequest
        );
        let slot = &mut self.slots[slot_index(slot_kind)];
        slot.handshake = Some(handshake);
        slot.included = included;
    }

    pub fn message(&self, kind: HandshakeType) -> Option<&HandshakeMessage> {
        self.slots[slot_index(default_slot_for(kind))]
            .handshake
            .as_ref()
            .map(|h| &h.message)
    }

    pub fn set_included(&mut self, kind: HandshakeType, included: bool) {
        self.slots[slot_index(default_slot_for(kind))].included = included;
    }

    /// RFC 5246 §7.4's Finished transcript: every included message,
    /// header and body, concatenated in protocol order. `through`
    /// truncates the list at (and including) the named kind, which the
    /// FSM uses to build the CertificateVerify signature input (everything
    /// up to but not including CertificateVerify itself, §4.1 edge case).
    pub fn serialize_transcript(&self, through: Option<HandshakeType>, is_dtls: bool) -> Vec<u8> {
        let through = through.map(default_slot_for);
        let mut out = Vec::new();
        for &kind in TRANSCRIPT_ORDER {
            let slot = &self.slots[slot_index(kind)];
            if !slot.included {
                continue;
            }
            if let Some(handshake) = &slot.handshake {
                let mut buf = Vec::with_capacity(HANDSHAKE_HEADER_LENGTH + handshake.header.length as usize);
                // ignore: marshal into an in-memory buffer never fails.
                let _ = handshake.marshal(&mut buf, is_dtls);
                out.extend_from_slice(&buf);
            }
            if Some(kind) == through {
                break;
            }
        }
        out
    }

    pub fn reset(&mut self) {
        *self = MessageManager::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ProtocolVersion;
    use crate::message::client_hello::ClientHello;
    use crate::message::random::HandshakeRandom;

    fn sample_client_hello() -> Handshake {
        let msg = HandshakeMessage::ClientHello(ClientHello {
            version: ProtocolVersion::DTLS1_2,
            random: HandshakeRandom::default(),
            session_id: vec![],
            cookie: vec![],
            cipher_suites: vec![crate::cipher_suite::CipherSuiteId::PskWithAes128GcmSha256],
        });
        Handshake::new(msg, 0, true).unwrap()
    }

    #[test]
    fn transcript_includes_client_hello_but_not_hello_verify_request() {
        let mut mgr = MessageManager::new();
        mgr.record(sample_client_hello());
        let hvr = Handshake::new(
            HandshakeMessage::HelloVerifyRequest(crate::message::hello_verify_request::HelloVerifyRequest {
                version: ProtocolVersion::DTLS1_2,
                cookie: vec![9, 9],
            }),
            0,
            true,
        )
        .unwrap();
        mgr.record(hvr);

        let transcript = mgr.serialize_transcript(None, true);
        assert!(!transcript.is_empty());
        assert!(mgr.message(HandshakeType::ClientHello).is_some());
        assert!(!mgr.slots[slot_index(SlotKind::HelloVerifyRequest)].included);
    }

    #[test]
    fn server_and_client_certificates_both_survive_to_the_transcript() {
        let mut mgr = MessageManager::new();
        let server_cert = Handshake::new(
            HandshakeMessage::Certificate(crate::message::certificate::Certificate {
                certificate_chain: vec![vec![1, 2, 3]],
            }),
            0,
            true,
        )
        .unwrap();
        let client_cert = Handshake::new(
            HandshakeMessage::Certificate(crate::message::certificate::Certificate {
                certificate_chain: vec![vec![4, 5, 6]],
            }),
            1,
            true,
        )
        .unwrap();
        mgr.record(server_cert);
        mgr.record_client_certificate(client_cert);

        match mgr.message(HandshakeType::Certificate) {
            Some(HandshakeMessage::Certificate(c)) => assert_eq!(c.certificate_chain, vec![vec![1, 2, 3]]),
            _ => panic!("expected the server's certificate under the default Certificate slot"),
        }
        let transcript = mgr.serialize_transcript(None, true);
        let needle_server = crate::message::certificate::Certificate {
            certificate_chain: vec![vec![1, 2, 3]],
        };
        let needle_client = crate::message::certificate::Certificate {
            certificate_chain: vec![vec![4, 5, 6]],
        };
        let mut server_buf = Vec::new();
        let mut client_buf = Vec::new();
        needle_server.marshal(&mut server_buf).unwrap();
        needle_client.marshal(&mut client_buf).unwrap();
        assert!(find_subslice(&transcript, &server_buf).is_some());
        assert!(find_subslice(&transcript, &client_buf).is_some());
    }

    #[test]
    fn transcript_order_puts_client_key_exchange_before_certificate_verify() {
        let cke_pos = TRANSCRIPT_ORDER.iter().position(|k| *k == SlotKind::ClientKeyExchange);
        let cv_pos = TRANSCRIPT_ORDER.iter().position(|k| *k == SlotKind::CertificateVerify);
        assert!(cke_pos < cv_pos);
    }

    fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }
}
