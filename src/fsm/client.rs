//! Client-side states (§4.3's transition table, client column). A PSK
//! suite skips Certificate/ServerKeyExchange/CertificateRequest entirely;
//! a certificate suite runs the full RFC 5246 §7.3 flow.

use crate::cipher_suite::{self, CipherSuiteId};
use crate::crypto::prf::{self, PrfHash};
use crate::error::{Error, Result};
use crate::fsm::{HandshakeState, StateOutput};
use crate::message::certificate::Certificate;
use crate::message::certificate_verify::CertificateVerify;
use crate::message::client_hello::ClientHello;
use crate::message::client_key_exchange::ClientKeyExchange;
use crate::message::finished::Finished;
use crate::message::random::HandshakeRandom;
use crate::message::{Handshake, HandshakeMessage, HandshakeType};
use crate::state_machine::{Context, Event};

fn is_psk(id: CipherSuiteId) -> bool {
    matches!(id, CipherSuiteId::PskWithNullSha256 | CipherSuiteId::PskWithAes128GcmSha256)
}

pub struct Disconnected;

impl HandshakeState for Disconnected {
    fn name(&self) -> &'static str {
        "Disconnected"
    }

    fn on_handshake_message(&mut self, _ctx: &mut Context, _message: Handshake) -> Result<StateOutput> {
        Err(Error::AlertUnexpectedMessage(
            "no handshake message is expected before InitiateHandshake".into(),
        ))
    }

    fn on_event(&mut self, ctx: &mut Context, event: Event) -> Result<StateOutput> {
        match event {
            Event::InitiateHandshake => {
                ctx.clear_flight();
                let random = HandshakeRandom::generate(ctx.crypto.as_ref(), 0)?;
                ctx.conn.client_random = random;
                let hello = ClientHello {
                    version: if ctx.role.is_dtls() {
                        crate::content::ProtocolVersion::DTLS1_2
                    } else {
                        crate::content::ProtocolVersion::TLS1_2
                    },
                    random,
                    session_id: Vec::new(),
                    cookie: ctx.conn.cookie.clone(),
                    cipher_suites: ctx.config.supported_cipher_suites.clone(),
                };
                let handshake = ctx.next_handshake(HandshakeMessage::ClientHello(hello))?;
                ctx.send_handshake(&handshake)?;
                Ok(StateOutput::transition(Box::new(AwaitingServerHello)))
            }
            Event::CloseRequest => Ok(StateOutput::stay()),
        }
    }
}

pub struct AwaitingServerHello;

impl HandshakeState for AwaitingServerHello {
    fn name(&self) -> &'static str {
        "AwaitingServerHello"
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        match message.message {
            HandshakeMessage::HelloVerifyRequest(hvr) => {
                // RFC 6347 §4.2.1: resend ClientHello with the server's
                // cookie; this round-trip is never part of the transcript.
                ctx.clear_flight();
                ctx.conn.cookie = hvr.cookie;
                ctx.messages.set_included(HandshakeType::ClientHello, false);
                let hello = ClientHello {
                    version: crate::content::ProtocolVersion::DTLS1_2,
                    random: ctx.conn.client_random,
                    session_id: Vec::new(),
                    cookie: ctx.conn.cookie.clone(),
                    cipher_suites: ctx.config.supported_cipher_suites.clone(),
                };
                let handshake = ctx.next_handshake(HandshakeMessage::ClientHello(hello))?;
                ctx.send_handshake(&handshake)?;
                Ok(StateOutput::stay())
            }
            HandshakeMessage::ServerHello(server_hello) => {
                cipher_suite::params_for_id(server_hello.cipher_suite)?;
                if !ctx.config.supported_cipher_suites.contains(&server_hello.cipher_suite) {
                    return Err(Error::AlertHandshakeFailure(format!(
                        "server selected {:?}, which the client never offered",
                        server_hello.cipher_suite
                    )));
                }
                ctx.conn.cipher_suite = server_hello.cipher_suite;
                ctx.conn.server_random = server_hello.random;
                Ok(StateOutput::transition(Box::new(AwaitingServerFlight {
                    server_cert_requested: false,
                })))
            }
            other => Err(Error::AlertUnexpectedMessage(format!(
                "unexpected {:?} while awaiting ServerHello",
                other.handshake_type()
            ))),
        }
    }
}

pub struct AwaitingServerFlight {
    server_cert_requested: bool,
}

impl HandshakeState for AwaitingServerFlight {
    fn name(&self) -> &'static str {
        "AwaitingServerFlight"
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        match &message.message {
            HandshakeMessage::Certificate(cert) => {
                ctx.crypto.validate_certificate_chain(&cert.certificate_chain)?;
                ctx.messages.record(message);
                Ok(StateOutput::stay())
            }
            HandshakeMessage::ServerKeyExchange(ske) => {
                if is_psk(ctx.conn.cipher_suite) {
                    return Err(Error::AlertUnexpectedMessage(
                        "ServerKeyExchange is not expected for a PSK suite".into(),
                    ));
                }
                let server_cert = ctx
                    .messages
                    .message(HandshakeType::Certificate)
                    .and_then(|m| match m {
                        HandshakeMessage::Certificate(c) => c.certificate_chain.first(),
                        _ => None,
                    })
                    .ok_or_else(|| Error::AlertHandshakeFailure("no server certificate to verify against".into()))?;
                let mut signed = Vec::new();
                signed.extend_from_slice(&ctx.conn.client_random.to_vec());
                signed.extend_from_slice(&ctx.conn.server_random.to_vec());
                signed.extend_from_slice(&ske.signed_params());
                ctx.crypto.verify(server_cert, &signed, &ske.signature)?;
                ctx.messages.record(message);
                Ok(StateOutput::stay())
            }
            HandshakeMessage::CertificateRequest(_) => {
                self.server_cert_requested = true;
                ctx.messages.record(message);
                Ok(StateOutput::stay())
            }
            HandshakeMessage::ServerHelloDone(_) => {
                ctx.messages.record(message);
                send_client_flight(ctx, self.server_cert_requested)?;
                Ok(StateOutput::transition(Box::new(AwaitingServerFinished)))
            }
            other => Err(Error::AlertUnexpectedMessage(format!(
                "unexpected {:?} in the server's flight",
                other.handshake_type()
            ))),
        }
    }
}

fn send_client_flight(ctx: &mut Context, server_cert_requested: bool) -> Result<()> {
    ctx.clear_flight();
    let is_psk_suite = is_psk(ctx.conn.cipher_suite);

    if server_cert_requested {
        let chain = ctx.crypto.local_certificate_chain();
        let handshake = ctx.next_handshake(HandshakeMessage::Certificate(Certificate {
            certificate_chain: chain,
        }))?;
        ctx.send_handshake(&handshake)?;
    }

    let pre_master_secret = if is_psk_suite {
        let psk = ctx
            .config
            .identity
            .psk
            .clone()
            .ok_or_else(|| Error::InvalidState("no PSK configured for a PSK cipher suite".into()))?;
        let identity = ctx.config.identity.psk_identity_hint.clone();
        let handshake = ctx.next_handshake(HandshakeMessage::ClientKeyExchange(ClientKeyExchange::Psk {
            identity,
        }))?;
        ctx.send_handshake(&handshake)?;
        prf::prf_psk_pre_master_secret(&psk)
    } else {
        let server_ske = ctx
            .messages
            .message(HandshakeType::ServerKeyExchange)
            .and_then(|m| match m {
                HandshakeMessage::ServerKeyExchange(ske) => Some(ske.public_key.clone()),
                _ => None,
            })
            .ok_or_else(|| Error::AlertHandshakeFailure("no ServerKeyExchange to respond to".into()))?;
        let (public_key, private_key) = ctx.crypto.generate_ecdhe_key_share()?;
        let shared_secret = ctx.crypto.ecdhe_shared_secret(&private_key, &server_ske)?;
        let handshake = ctx.next_handshake(HandshakeMessage::ClientKeyExchange(ClientKeyExchange::Ecdhe {
            public_key,
        }))?;
        ctx.send_handshake(&handshake)?;
        shared_secret
    };

    if server_cert_requested {
        let transcript = ctx.messages.serialize_transcript(None, ctx.role.is_dtls());
        let signature = ctx.crypto.sign(&transcript)?;
        let handshake = ctx.next_handshake(HandshakeMessage::CertificateVerify(CertificateVerify {
            signature_algorithm: crate::signature_hash_algorithm::SignatureHashAlgorithm::ECDSA_SHA256,
            signature,
        }))?;
        ctx.send_handshake(&handshake)?;
    }

    ctx.conn.master_secret = prf::master_secret(
        PrfHash::Sha256,
        &pre_master_secret,
        &ctx.conn.client_random.to_vec(),
        &ctx.conn.server_random.to_vec(),
        false,
        None,
    )?;

    ctx.record_layer
        .install_write_security_parameters(ctx.conn.derived_security_parameters())?;
    ctx.record_layer
        .send(crate::content::ContentType::ChangeCipherSpec, &[0x01])?;

    let transcript = ctx.messages.serialize_transcript(None, ctx.role.is_dtls());
    let transcript_hash = ctx.crypto.hmac(ctx.conn.cipher_suite, &ctx.conn.master_secret, &transcript)?;
    let verify_data = prf::verify_data(PrfHash::Sha256, &ctx.conn.master_secret, &transcript_hash, true)?;
    let finished_handshake = ctx.next_handshake(HandshakeMessage::Finished(Finished { verify_data }))?;
    ctx.send_handshake(&finished_handshake)?;

    Ok(())
}

pub struct AwaitingServerFinished;

impl HandshakeState for AwaitingServerFinished {
    fn name(&self) -> &'static str {
        "AwaitingServerFinished"
    }

    fn on_change_cipher_spec(&mut self, ctx: &mut Context) -> Result<StateOutput> {
        ctx.record_layer
            .install_read_security_parameters(ctx.conn.derived_security_parameters())?;
        Ok(StateOutput::stay())
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        let finished = match message.message {
            HandshakeMessage::Finished(f) => f,
            other => {
                return Err(Error::AlertUnexpectedMessage(format!(
                    "unexpected {:?} while awaiting Finished",
                    other.handshake_type()
                )))
            }
        };
        let transcript = ctx.messages.serialize_transcript(None, ctx.role.is_dtls());
        let transcript_hash = ctx.crypto.hmac(ctx.conn.cipher_suite, &ctx.conn.master_secret, &transcript)?;
        let expected = prf::verify_data(PrfHash::Sha256, &ctx.conn.master_secret, &transcript_hash, false)?;
        if expected != finished.verify_data {
            return Err(Error::AlertHandshakeFailure(
                "server Finished.verify_data mismatch".into(),
            ));
        }
        ctx.conn.handshake_completed = true;
        Ok(StateOutput::transition(Box::new(Connected)))
    }
}

pub struct Connected;

impl HandshakeState for Connected {
    fn name(&self) -> &'static str {
        "Connected"
    }

    fn on_handshake_message(&mut self, _ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        if message.message.handshake_type() == HandshakeType::HelloRequest {
            // RFC 5246 §7.4.1.1: the peer wants to renegotiate. §9
            // REDESIGN FLAGS rejects renegotiation outright rather than
            // the teacher's original best-effort support.
            return Err(Error::RenegotiationRejected);
        }
        Err(Error::AlertUnexpectedMessage(format!(
            "unexpected {:?} once connected",
            message.message.handshake_type()
        )))
    }
}
