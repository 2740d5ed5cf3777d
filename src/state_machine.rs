//! §4.4 HandshakeStateMachine: the synchronous engine that owns the
//! current [`HandshakeState`], the per-connection [`ConnectionState`],
//! and the [`MessageManager`] transcript, and drives transitions as
//! record-layer events arrive. Grounded on the teacher's
//! `handshaker.rs::HandshakeFsm`, restructured from its async
//! `tokio::select!` loop into the plain method-call shape §5 requires.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::aggregator::{AggregatorEvent, HandshakeAggregator};
use crate::alert::{Alert, AlertDescription, AlertLevel};
use crate::config::Config;
use crate::content::ContentType;
use crate::crypto::{CryptoProvider, EcdhePrivateKey};
use crate::error::{Error, Result};
use crate::fsm::client::Disconnected as ClientDisconnected;
use crate::fsm::server::Disconnected as ServerDisconnected;
use crate::fsm::{HandshakeState, Role, StateOutput};
use crate::message::Handshake;
use crate::message_manager::MessageManager;
use crate::record_layer::RecordLayer;
use crate::state::ConnectionState;
use crate::timer::{RetransmitSchedule, TimerDirective};

/// Requests the embedder makes of the state machine that aren't
/// record-layer traffic (§6 "Upward interface", inbound direction).
#[derive(Debug)]
pub enum Event {
    InitiateHandshake,
    CloseRequest,
}

/// Notifications the state machine raises to the embedder (§6 "Upward
/// interface", outbound direction).
#[derive(Debug)]
pub enum UpwardEvent {
    Connected,
    Disconnected,
    ApplicationData(Vec<u8>),
}

/// Everything a state needs to do its job, threaded through every hook
/// call. Named after the `TlsCommFlowContext` pattern in the reference
/// C++ state machine, generalized to own the pieces this crate splits
/// into separate modules.
pub struct Context {
    pub role: Role,
    pub config: Arc<Config>,
    pub crypto: Arc<dyn CryptoProvider>,
    pub conn: ConnectionState,
    pub messages: MessageManager,
    pub record_layer: Box<dyn RecordLayer + Send>,
    pub ecdhe_private_key: Option<EcdhePrivateKey>,
    pub upward: Vec<UpwardEvent>,
    /// DTLS epoch the most recently dispatched handshake record arrived
    /// on; TLS traffic is always epoch 0. Lets a state distinguish a
    /// fresh epoch-0 ClientHello (a reconnection attempt) from in-epoch
    /// traffic without the aggregator needing to know about epochs.
    pub last_epoch: u16,
    /// Raw bytes of every handshake record sent since the last call to
    /// `clear_flight`, so the state machine can resend them verbatim on
    /// a retransmit timeout or a duplicate-message signal from the peer
    /// (§4.6).
    pending_flight: Vec<Vec<u8>>,
    /// Whether this period's flight has already been retransmitted once
    /// in response to a duplicate message from the peer (§4.3, §4.6: the
    /// retransmit-on-duplicate path is gated by a per-period latch so N
    /// duplicate records from one retransmitted peer flight only trigger
    /// one resend of ours, not N). Cleared whenever a fresh flight is
    /// built via `clear_flight`.
    retransmit_latched: bool,
    /// Server-side DTLS cookie HMAC secret (RFC 6347 §4.2.1), drawn once
    /// per connection attempt and reused across the HelloVerifyRequest
    /// round-trip so the second ClientHello's cookie actually verifies.
    cookie_secret: Option<Vec<u8>>,
}

impl Context {
    fn new(role: Role, config: Arc<Config>, record_layer: Box<dyn RecordLayer + Send>) -> Self {
        let crypto = config.crypto.clone();
        Context {
            conn: ConnectionState::new(role.is_client(), role.is_dtls()),
            role,
            config,
            crypto,
            messages: MessageManager::new(),
            record_layer,
            ecdhe_private_key: None,
            upward: Vec::new(),
            last_epoch: 0,
            pending_flight: Vec::new(),
            retransmit_latched: false,
            cookie_secret: None,
        }
    }

    /// Lazily draws this connection's DTLS cookie secret and caches it,
    /// so every cookie issued and verified in one handshake attempt uses
    /// the same key.
    pub fn cookie_secret(&mut self) -> Result<Vec<u8>> {
        if let Some(secret) = &self.cookie_secret {
            return Ok(secret.clone());
        }
        let mut secret = vec![0u8; 32];
        self.crypto.fill_random(&mut secret)?;
        self.cookie_secret = Some(secret.clone());
        Ok(secret)
    }

    pub fn send_handshake(&mut self, handshake: &Handshake) -> Result<()> {
        let mut buf = Vec::new();
        handshake.marshal(&mut buf, self.role.is_dtls())?;
        self.record_layer.send(ContentType::Handshake, &buf)?;
        self.pending_flight.push(buf);
        Ok(())
    }

    pub fn next_handshake(&mut self, message: crate::message::HandshakeMessage) -> Result<Handshake> {
        let seq = self.conn.next_send_sequence();
        let handshake = Handshake::new(message, seq, self.role.is_dtls())?;
        // The client's own Certificate (client-auth) must land in its own
        // transcript slot, distinct from the server's Certificate the
        // client separately records on receipt (§4.1).
        let is_client_certificate = self.role.is_client()
            && matches!(handshake.message, crate::message::HandshakeMessage::Certificate(_));
        if is_client_certificate {
            self.messages.record_client_certificate(handshake.clone());
        } else {
            self.messages.record(handshake.clone());
        }
        Ok(handshake)
    }

    /// Call at the start of building a new outbound flight so a
    /// retransmit doesn't keep resending a stale, already-superseded one.
    /// Also opens a fresh retransmit period: the next duplicate message
    /// from the peer is allowed to trigger one resend again.
    pub fn clear_flight(&mut self) {
        self.pending_flight.clear();
        self.retransmit_latched = false;
    }
}

pub struct HandshakeStateMachine {
    ctx: Context,
    current: Box<dyn HandshakeState>,
    retransmit: RetransmitSchedule,
    aggregator: HandshakeAggregator,
}

/// What one call into the state machine produced: upward events to
/// deliver to the embedder and what it should do with its timer.
pub struct StateMachineOutput {
    pub events: Vec<UpwardEvent>,
    pub timer: TimerDirective,
}

impl HandshakeStateMachine {
    pub fn open(role: Role, config: Arc<Config>, record_layer: Box<dyn RecordLayer + Send>) -> Result<Self> {
        config.validate()?;
        let retransmit = RetransmitSchedule::new(config.retransmit_interval, config.retransmit_retries);
        let aggregator = HandshakeAggregator::new(role.is_dtls(), false);
        let ctx = Context::new(role, config, record_layer);
        let current: Box<dyn HandshakeState> = if role.is_client() {
            Box::new(ClientDisconnected)
        } else {
            Box::new(ServerDisconnected)
        };
        Ok(HandshakeStateMachine {
            ctx,
            current,
            retransmit,
            aggregator,
        })
    }

    pub fn initiate_handshake(&mut self) -> Result<StateMachineOutput> {
        trace!("initiate_handshake in state {}", self.current.name());
        self.dispatch(|state, ctx| state.on_event(ctx, Event::InitiateHandshake))
    }

    pub fn on_handshake_data(&mut self, epoch: u16, data: &[u8]) -> Result<StateMachineOutput> {
        self.ctx.last_epoch = epoch;
        // Keep the aggregator's PSK expectation in step with whatever the
        // ClientHello/ServerHello exchange just negotiated.
        self.aggregator.set_is_psk(is_psk_suite(self.ctx.conn.cipher_suite));
        let events = match self.aggregator.push(data) {
            Ok(events) => events,
            Err(err) => return Ok(self.handle_error(err)),
        };

        let mut out = StateMachineOutput {
            events: Vec::new(),
            timer: TimerDirective::None,
        };
        for event in events {
            let result = match event {
                AggregatorEvent::CompleteMessage(handshake) => {
                    self.dispatch(|state, ctx| state.on_handshake_message(ctx, handshake))?
                }
                AggregatorEvent::DuplicateMessage => {
                    if self.ctx.retransmit_latched {
                        debug!("duplicate message ignored: already retransmitted this period");
                        StateMachineOutput {
                            events: Vec::new(),
                            timer: TimerDirective::None,
                        }
                    } else {
                        debug!("retransmitting last flight for a duplicate message");
                        self.resend_last_flight()?;
                        self.ctx.retransmit_latched = true;
                        StateMachineOutput {
                            events: Vec::new(),
                            timer: self.retransmit.initial(),
                        }
                    }
                }
            };
            out.events.extend(result.events);
            out.timer = result.timer;
        }
        Ok(out)
    }

    pub fn on_change_cipher(&mut self) -> Result<StateMachineOutput> {
        self.dispatch(|state, ctx| state.on_change_cipher_spec(ctx))
    }

    pub fn on_alert(&mut self, alert: Alert) -> Result<StateMachineOutput> {
        warn!("received alert {:?}/{:?}", alert.level, alert.description);
        Ok(self.handle_error(alert.to_error()))
    }

    pub fn on_close_request(&mut self) -> Result<StateMachineOutput> {
        let close = Alert {
            level: AlertLevel::Warning,
            description: AlertDescription::CloseNotify,
        };
        let mut buf = Vec::new();
        close.marshal(&mut buf)?;
        let _ = self.ctx.record_layer.send(ContentType::Alert, &buf);
        self.disconnect();
        Ok(StateMachineOutput {
            events: vec![UpwardEvent::Disconnected],
            timer: TimerDirective::Cancel,
        })
    }

    pub fn on_timer_event(&mut self) -> Result<StateMachineOutput> {
        match self.retransmit.on_timeout() {
            Some(directive) => {
                self.resend_last_flight()?;
                self.ctx.retransmit_latched = true;
                let mut out = self.dispatch(|state, ctx| state.on_timer(ctx))?;
                out.timer = directive;
                Ok(out)
            }
            None => Ok(self.handle_error(Error::AlertHandshakeFailure(
                "retransmission retries exhausted".into(),
            ))),
        }
    }

    pub fn disconnect(&mut self) {
        self.ctx.record_layer.disconnect();
    }

    fn dispatch<F>(&mut self, f: F) -> Result<StateMachineOutput>
    where
        F: FnOnce(&mut dyn HandshakeState, &mut Context) -> Result<StateOutput>,
    {
        match f(self.current.as_mut(), &mut self.ctx) {
            Ok(output) => Ok(self.apply(output)),
            Err(err) => Ok(self.handle_error(err)),
        }
    }

    fn apply(&mut self, mut output: StateOutput) -> StateMachineOutput {
        let mut events = std::mem::take(&mut self.ctx.upward);
        if let Some(next) = output.next.take() {
            debug!("{} -> {}", self.current.name(), next.name());
            self.current = next;
            match self.current.on_enter(&mut self.ctx) {
                Ok(enter_output) => {
                    events.extend(std::mem::take(&mut self.ctx.upward));
                    if enter_output.timer != TimerDirective::None {
                        output.timer = enter_output.timer;
                    }
                }
                Err(err) => return self.handle_error(err),
            }
            if self.current.name() == "Connected" {
                events.push(UpwardEvent::Connected);
                self.retransmit.reset();
            }
        }
        StateMachineOutput {
            events,
            timer: output.timer,
        }
    }

    fn handle_error(&mut self, err: Error) -> StateMachineOutput {
        warn!("handshake failed: {err}");
        if let Some((level, description)) = err.to_outbound_alert() {
            let alert = Alert { level, description };
            let mut buf = Vec::new();
            if alert.marshal(&mut buf).is_ok() {
                let _ = self.ctx.record_layer.send(ContentType::Alert, &buf);
            }
        }
        self.disconnect();
        StateMachineOutput {
            events: vec![UpwardEvent::Disconnected],
            timer: TimerDirective::Cancel,
        }
    }

    fn resend_last_flight(&mut self) -> Result<()> {
        let records = self.ctx.pending_flight.clone();
        for record in &records {
            self.ctx.record_layer.send(ContentType::Handshake, record)?;
        }
        Ok(())
    }
}

/// `ClientKeyExchange`'s wire shape depends on which key-exchange family
/// the negotiated suite uses (§4.3); every suite this crate supports is
/// unambiguous from its ID alone.
fn is_psk_suite(id: crate::cipher_suite::CipherSuiteId) -> bool {
    matches!(
        id,
        crate::cipher_suite::CipherSuiteId::PskWithNullSha256
            | crate::cipher_suite::CipherSuiteId::PskWithAes128GcmSha256
    )
}
