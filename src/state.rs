//! Per-connection state carried across the handshake, grounded on the
//! teacher's `State` struct (epochs, sequence numbers, randoms, master
//! secret) but trimmed to what this spec's FSM actually reads and
//! writes; session resumption and exporter fields are out of scope.

use crate::cipher_suite::CipherSuiteId;
use crate::message::random::HandshakeRandom;
use crate::record_layer::SecurityParameters;

/// Current epoch's live parameters vs. the ones being negotiated for the
/// next epoch (§3's "Security parameters (current)" / "(next)" split).
pub struct ConnectionState {
    pub is_client: bool,
    pub is_dtls: bool,

    pub client_random: HandshakeRandom,
    pub server_random: HandshakeRandom,

    pub cipher_suite: CipherSuiteId,
    pub master_secret: Vec<u8>,

    /// DTLS anti-replay / retransmit bookkeeping (§4.6, §4.7).
    pub cookie: Vec<u8>,
    pub message_sequence_send: u16,
    pub message_sequence_recv: u16,

    /// True once both sides have exchanged Finished and the connection
    /// has moved to `Connected` (§4.3).
    pub handshake_completed: bool,

    pub negotiated_extended_master_secret: bool,
}

impl ConnectionState {
    pub fn new(is_client: bool, is_dtls: bool) -> Self {
        ConnectionState {
            is_client,
            is_dtls,
            client_random: HandshakeRandom::default(),
            server_random: HandshakeRandom::default(),
            cipher_suite: CipherSuiteId::NullWithNullNull,
            master_secret: Vec::new(),
            cookie: Vec::new(),
            message_sequence_send: 0,
            message_sequence_recv: 0,
            handshake_completed: false,
            negotiated_extended_master_secret: false,
        }
    }

    pub fn next_send_sequence(&mut self) -> u16 {
        let seq = self.message_sequence_send;
        self.message_sequence_send = self.message_sequence_send.wrapping_add(1);
        seq
    }

    pub fn derived_security_parameters(&self) -> SecurityParameters {
        SecurityParameters {
            cipher_suite: self.cipher_suite,
            is_client: self.is_client,
            client_random: self.client_random,
            server_random: self.server_random,
            master_secret: self.master_secret.clone(),
            psk_identity_hint: Vec::new(),
        }
    }
}
