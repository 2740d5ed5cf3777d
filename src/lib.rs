//! A (D)TLS 1.2 handshake state machine and the narrow record-layer
//! interface it drives through. The wire codec, the PRF, and the cipher
//! suite negotiation table live here; the bulk record transform (MAC,
//! AEAD, replay window, datagram transport) is the embedder's job behind
//! [`record_layer::RecordLayer`], and entropy/signing/certificate
//! validation are the embedder's job behind [`crypto::CryptoProvider`].

pub mod aggregator;
pub mod alert;
pub mod application_data;
pub mod buffer;
pub mod change_cipher_spec;
pub mod cipher_suite;
pub mod config;
pub mod content;
pub mod cookie;
pub mod crypto;
pub mod error;
pub mod fsm;
pub mod message;
pub mod message_manager;
pub mod provider;
pub mod record_layer;
pub mod signature_hash_algorithm;
pub mod state;
pub mod state_machine;
pub mod timer;

pub use config::{Config, Identity, Transport};
pub use error::{Error, Result};
pub use fsm::Role;
pub use provider::ProviderFacade;
pub use state_machine::{Event, HandshakeStateMachine, UpwardEvent};
