//! Server-side states (§4.3's transition table, server column), including
//! DTLS's stateless cookie round-trip (§4.7) before any state is
//! committed for a new client.

use crate::cipher_suite;
use crate::content::ProtocolVersion;
use crate::cookie;
use crate::crypto::prf::{self, PrfHash};
use crate::error::{Error, Result};
use crate::fsm::{HandshakeState, StateOutput};
use crate::message::certificate::Certificate;
use crate::message::client_key_exchange::ClientKeyExchange;
use crate::message::finished::Finished;
use crate::message::hello_verify_request::HelloVerifyRequest;
use crate::message::server_hello::ServerHello;
use crate::message::server_hello_done::ServerHelloDone;
use crate::message::server_key_exchange::ServerKeyExchange;
use crate::message::random::HandshakeRandom;
use crate::message::{Handshake, HandshakeMessage};
use crate::state_machine::Context;

pub struct Disconnected;

impl HandshakeState for Disconnected {
    fn name(&self) -> &'static str {
        "Disconnected"
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        let hello = match message.message {
            HandshakeMessage::ClientHello(hello) => hello,
            other => {
                return Err(Error::AlertUnexpectedMessage(format!(
                    "unexpected {:?} before any ClientHello",
                    other.handshake_type()
                )))
            }
        };

        let cookie_verification_is_on = ctx.role.is_dtls() && ctx.config.cookie_verification_is_on;

        if cookie_verification_is_on && hello.cookie.is_empty() {
            // RFC 6347 §4.2.1: challenge the client before committing
            // any per-connection state.
            let secret = ctx.cookie_secret()?;
            let cookie = cookie::generate_cookie(ctx.crypto.as_ref(), &secret, &hello.random, &[])?;
            ctx.conn.cookie = cookie.clone();
            let hvr = HelloVerifyRequest {
                version: ProtocolVersion::DTLS1_2,
                cookie,
            };
            let mut buf = Vec::new();
            let handshake = Handshake::new(HandshakeMessage::HelloVerifyRequest(hvr), 0, true)?;
            handshake.marshal(&mut buf, true)?;
            ctx.record_layer.send(crate::content::ContentType::Handshake, &buf)?;
            return Ok(StateOutput::stay());
        }

        if cookie_verification_is_on {
            let secret = ctx.cookie_secret()?;
            let expected = cookie::verify_cookie(ctx.crypto.as_ref(), &secret, &hello.random, &[], &hello.cookie)?;
            if !expected {
                return Err(Error::AlertHandshakeFailure("dtls cookie mismatch".into()));
            }
        }

        ctx.clear_flight();
        ctx.conn.client_random = hello.random;
        let cipher_suite = cipher_suite::select_cipher_suite(
            &hello.cipher_suites,
            &ctx.config.supported_cipher_suites,
        )?;
        ctx.conn.cipher_suite = cipher_suite;

        let server_random = HandshakeRandom::generate(ctx.crypto.as_ref(), 0)?;
        ctx.conn.server_random = server_random;

        let hello_handshake = ctx.next_handshake(HandshakeMessage::ServerHello(ServerHello {
            version: hello.version,
            random: server_random,
            session_id: Vec::new(),
            cipher_suite,
        }))?;
        ctx.send_handshake(&hello_handshake)?;

        let client_cert_requested = cipher_suite::params_for_id(cipher_suite)?.is_certificate;
        if client_cert_requested {
            let chain = ctx.crypto.local_certificate_chain();
            let cert_handshake = ctx.next_handshake(HandshakeMessage::Certificate(Certificate {
                certificate_chain: chain,
            }))?;
            ctx.send_handshake(&cert_handshake)?;

            let (public_key, private_key) = ctx.crypto.generate_ecdhe_key_share()?;
            ctx.ecdhe_private_key = Some(private_key);
            let mut signed = Vec::new();
            signed.extend_from_slice(&ctx.conn.client_random.to_vec());
            signed.extend_from_slice(&ctx.conn.server_random.to_vec());
            let algo = crate::signature_hash_algorithm::SignatureHashAlgorithm::ECDSA_SHA256;
            let ske_unsigned = ServerKeyExchange {
                public_key,
                signature_algorithm: algo,
                signature: Vec::new(),
            };
            signed.extend_from_slice(&ske_unsigned.signed_params());
            let signature = ctx.crypto.sign(&signed)?;
            let ske = ServerKeyExchange {
                signature,
                ..ske_unsigned
            };
            let ske_handshake = ctx.next_handshake(HandshakeMessage::ServerKeyExchange(ske))?;
            ctx.send_handshake(&ske_handshake)?;
        }

        let done_handshake = ctx.next_handshake(HandshakeMessage::ServerHelloDone(ServerHelloDone))?;
        ctx.send_handshake(&done_handshake)?;

        Ok(StateOutput::transition(Box::new(AwaitingClientFlight)))
    }
}

pub struct AwaitingClientFlight;

impl HandshakeState for AwaitingClientFlight {
    fn name(&self) -> &'static str {
        "AwaitingClientFlight"
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        match &message.message {
            HandshakeMessage::Certificate(cert) => {
                if !cert.certificate_chain.is_empty() {
                    ctx.crypto.validate_certificate_chain(&cert.certificate_chain)?;
                }
                ctx.messages.record_client_certificate(message);
                Ok(StateOutput::stay())
            }
            HandshakeMessage::ClientKeyExchange(cke) => {
                let pre_master_secret = match cke {
                    ClientKeyExchange::Psk { identity: _ } => {
                        let psk = ctx
                            .config
                            .identity
                            .psk
                            .clone()
                            .ok_or_else(|| Error::InvalidState("no PSK configured for a PSK cipher suite".into()))?;
                        prf::prf_psk_pre_master_secret(&psk)
                    }
                    ClientKeyExchange::Ecdhe { public_key } => {
                        let private_key = ctx.ecdhe_private_key.take().ok_or_else(|| {
                            Error::InvalidState("no ECDHE key share was generated for this connection".into())
                        })?;
                        ctx.crypto.ecdhe_shared_secret(&private_key, public_key)?
                    }
                };
                ctx.messages.record(message);

                ctx.conn.master_secret = prf::master_secret(
                    PrfHash::Sha256,
                    &pre_master_secret,
                    &ctx.conn.client_random.to_vec(),
                    &ctx.conn.server_random.to_vec(),
                    false,
                    None,
                )?;
                Ok(StateOutput::transition(Box::new(AwaitingClientFinished)))
            }
            other => Err(Error::AlertUnexpectedMessage(format!(
                "unexpected {:?} in the client's flight",
                other.handshake_type()
            ))),
        }
    }
}

pub struct AwaitingClientFinished;

impl HandshakeState for AwaitingClientFinished {
    fn name(&self) -> &'static str {
        "AwaitingClientFinished"
    }

    fn on_change_cipher_spec(&mut self, ctx: &mut Context) -> Result<StateOutput> {
        ctx.record_layer
            .install_read_security_parameters(ctx.conn.derived_security_parameters())?;
        Ok(StateOutput::stay())
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        let finished = match message.message {
            HandshakeMessage::Finished(f) => f,
            HandshakeMessage::CertificateVerify(_) => {
                // Client-cert auth: accepted but not independently
                // verified against the signed transcript in this
                // reduced flow; stay and wait for the real Finished.
                return Ok(StateOutput::stay());
            }
            other => {
                return Err(Error::AlertUnexpectedMessage(format!(
                    "unexpected {:?} while awaiting client Finished",
                    other.handshake_type()
                )))
            }
        };

        let transcript = ctx.messages.serialize_transcript(None, ctx.role.is_dtls());
        let transcript_hash = ctx.crypto.hmac(ctx.conn.cipher_suite, &ctx.conn.master_secret, &transcript)?;
        let expected = prf::verify_data(PrfHash::Sha256, &ctx.conn.master_secret, &transcript_hash, true)?;
        if expected != finished.verify_data {
            return Err(Error::AlertHandshakeFailure(
                "client Finished.verify_data mismatch".into(),
            ));
        }

        ctx.clear_flight();
        ctx.record_layer
            .install_write_security_parameters(ctx.conn.derived_security_parameters())?;
        ctx.record_layer
            .send(crate::content::ContentType::ChangeCipherSpec, &[0x01])?;

        let transcript = ctx.messages.serialize_transcript(None, ctx.role.is_dtls());
        let transcript_hash = ctx.crypto.hmac(ctx.conn.cipher_suite, &ctx.conn.master_secret, &transcript)?;
        let verify_data = prf::verify_data(PrfHash::Sha256, &ctx.conn.master_secret, &transcript_hash, false)?;
        let finished_handshake = ctx.next_handshake(HandshakeMessage::Finished(Finished { verify_data }))?;
        ctx.send_handshake(&finished_handshake)?;

        ctx.conn.handshake_completed = true;
        Ok(StateOutput::transition(Box::new(Connected)))
    }
}

pub struct Connected;

impl HandshakeState for Connected {
    fn name(&self) -> &'static str {
        "Connected"
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput> {
        let is_reconnection_attempt = ctx.role.is_dtls()
            && ctx.config.cookie_verification_is_on
            && ctx.last_epoch == 0
            && matches!(message.message, HandshakeMessage::ClientHello(_));

        if is_reconnection_attempt {
            // A fresh epoch-0 ClientHello while already connected: treat
            // this as a new connection attempt from the same peer rather
            // than unexpected traffic (§4.3 server "Connected").
            ctx.conn = crate::state::ConnectionState::new(ctx.role.is_client(), ctx.role.is_dtls());
            ctx.messages.reset();
            ctx.clear_flight();
            ctx.ecdhe_private_key = None;
            let mut disconnected = Disconnected;
            return disconnected.on_handshake_message(ctx, message);
        }

        Err(Error::AlertUnexpectedMessage(format!(
            "unexpected {:?} once connected",
            message.message.handshake_type()
        )))
    }
}
