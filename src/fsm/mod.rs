//! §4.3 HandshakeState hooks, grounded on
//! `original_source/.../handshake_state.h`'s `OnEnter` /
//! `OnHandshakeMessageReceived` / `OnChangeCipherMessageReceived` /
//! `OnTimerEvent` shape and on the teacher's `HandshakeState` enum in
//! `handshaker.rs`, reworked from an async driver loop into synchronous
//! named states per §5.

pub mod client;
pub mod server;

use crate::error::Result;
use crate::message::Handshake;
use crate::state_machine::{Context, Event};
use crate::timer::TimerDirective;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Role {
    ClientTls,
    ClientDtls,
    ServerTls,
    ServerDtls,
}

impl Role {
    pub fn is_client(&self) -> bool {
        matches!(self, Role::ClientTls | Role::ClientDtls)
    }

    pub fn is_dtls(&self) -> bool {
        matches!(self, Role::ClientDtls | Role::ServerDtls)
    }
}

/// What a state produces in response to one event: zero or more
/// upward/downward side effects plus where the FSM goes next.
pub struct StateOutput {
    pub timer: TimerDirective,
    pub next: Option<Box<dyn HandshakeState>>,
}

impl StateOutput {
    pub fn stay() -> Self {
        StateOutput {
            timer: TimerDirective::None,
            next: None,
        }
    }

    pub fn transition(next: Box<dyn HandshakeState>) -> Self {
        StateOutput {
            timer: TimerDirective::None,
            next: Some(next),
        }
    }

    pub fn with_timer(mut self, timer: TimerDirective) -> Self {
        self.timer = timer;
        self
    }
}

/// One named state in the handshake FSM (§4.3). Every hook is
/// synchronous; a state that needs to wait for something just returns
/// `StateOutput::stay()` and lets a later event drive the next
/// transition (§5's no-blocking rule).
pub trait HandshakeState: Send {
    fn name(&self) -> &'static str;

    fn on_enter(&mut self, ctx: &mut Context) -> Result<StateOutput> {
        let _ = ctx;
        Ok(StateOutput::stay())
    }

    fn on_handshake_message(&mut self, ctx: &mut Context, message: Handshake) -> Result<StateOutput>;

    fn on_change_cipher_spec(&mut self, ctx: &mut Context) -> Result<StateOutput> {
        let _ = ctx;
        Err(crate::error::Error::AlertUnexpectedMessage(format!(
            "change_cipher_spec is not expected in state {}",
            self.name()
        )))
    }

    fn on_timer(&mut self, ctx: &mut Context) -> Result<StateOutput> {
        let _ = ctx;
        Ok(StateOutput::stay())
    }

    /// A higher-level request reached this state: `InitiateHandshake` on
    /// `Disconnected`, or an application `Event` like a close request
    /// while connected (§6 "Upward interface").
    fn on_event(&mut self, ctx: &mut Context, event: Event) -> Result<StateOutput> {
        let _ = (ctx, event);
        Ok(StateOutput::stay())
    }
}
