//! The only place this crate touches `tokio` (§5's concurrency
//! redesign): an async driver loop shaped like the teacher's
//! `handshaker.rs::HandshakeFsm::run` `tokio::select!`, but selecting
//! over record-layer input, timer expiry and application requests
//! instead of the teacher's flight-preparing/sending/waiting phases. The
//! [`HandshakeStateMachine`] underneath never awaits anything.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;

use crate::alert::Alert;
use crate::config::Config;
use crate::error::Result;
use crate::fsm::Role;
use crate::record_layer::RecordLayer;
use crate::state_machine::{Event, HandshakeStateMachine, UpwardEvent};
use crate::timer::TimerDirective;

/// Inbound traffic and commands the facade multiplexes onto the
/// synchronous state machine.
enum Inbound {
    HandshakeData(u16, Vec<u8>),
    ChangeCipherSpec,
    Alert(Alert),
    Command(Event),
    Shutdown,
}

/// A handle the embedder uses to push record-layer events and commands
/// into a running handshake, and to receive the events it raises back.
pub struct ProviderFacade {
    inbound: mpsc::UnboundedSender<Inbound>,
    upward: mpsc::UnboundedReceiver<UpwardEvent>,
    done: oneshot::Receiver<Result<()>>,
}

impl ProviderFacade {
    pub fn spawn(role: Role, config: Arc<Config>, record_layer: Box<dyn RecordLayer + Send>) -> Result<Self> {
        let machine = HandshakeStateMachine::open(role, config, record_layer)?;
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (upward_tx, upward_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(run(machine, inbound_rx, upward_tx, done_tx));

        Ok(ProviderFacade {
            inbound: inbound_tx,
            upward: upward_rx,
            done: done_rx,
        })
    }

    pub fn initiate_handshake(&self) {
        let _ = self.inbound.send(Inbound::Command(Event::InitiateHandshake));
    }

    /// `epoch` is the DTLS epoch the record arrived on (always 0 for
    /// TLS), needed to recognize an epoch-0 ClientHello as a reconnection
    /// attempt once already `Connected`.
    pub fn on_handshake_data(&self, epoch: u16, data: Vec<u8>) {
        let _ = self.inbound.send(Inbound::HandshakeData(epoch, data));
    }

    pub fn on_change_cipher_spec(&self) {
        let _ = self.inbound.send(Inbound::ChangeCipherSpec);
    }

    pub fn on_alert(&self, alert: Alert) {
        let _ = self.inbound.send(Inbound::Alert(alert));
    }

    pub fn close(&self) {
        let _ = self.inbound.send(Inbound::Command(Event::CloseRequest));
    }

    /// Receive the next upward event (`Connected`, `Disconnected`,
    /// decrypted `ApplicationData`). Returns `None` once the driver task
    /// has exited.
    pub async fn recv(&mut self) -> Option<UpwardEvent> {
        self.upward.recv().await
    }

    /// Wait for the driver task to finish and report whether it ended
    /// cleanly.
    pub async fn join(self) -> Result<()> {
        match self.done.await {
            Ok(result) => result,
            Err(_) => Ok(()),
        }
    }
}

async fn run(
    mut machine: HandshakeStateMachine,
    mut inbound: mpsc::UnboundedReceiver<Inbound>,
    upward: mpsc::UnboundedSender<UpwardEvent>,
    done: oneshot::Sender<Result<()>>,
) {
    let mut armed_timer = None;

    let result = loop {
        let timer_fut = async {
            match armed_timer {
                Some(duration) => sleep(duration).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;

            msg = inbound.recv() => {
                let msg = match msg {
                    Some(msg) => msg,
                    None => break Ok(()),
                };
                let outcome = match msg {
                    Inbound::HandshakeData(epoch, data) => machine.on_handshake_data(epoch, &data),
                    Inbound::ChangeCipherSpec => machine.on_change_cipher(),
                    Inbound::Alert(alert) => machine.on_alert(alert),
                    Inbound::Command(Event::InitiateHandshake) => machine.initiate_handshake(),
                    Inbound::Command(Event::CloseRequest) => machine.on_close_request(),
                    Inbound::Shutdown => break Ok(()),
                };
                match outcome {
                    Ok(output) => {
                        armed_timer = apply_timer(armed_timer, output.timer);
                        for event in output.events {
                            let is_disconnect = matches!(event, UpwardEvent::Disconnected);
                            if upward.send(event).is_err() {
                                break;
                            }
                            if is_disconnect {
                                break;
                            }
                        }
                    }
                    Err(err) => {
                        error!("handshake state machine returned a fatal error: {err}");
                        break Err(err);
                    }
                }
            }

            _ = timer_fut => {
                match machine.on_timer_event() {
                    Ok(output) => {
                        armed_timer = apply_timer(armed_timer, output.timer);
                        for event in output.events {
                            let _ = upward.send(event);
                        }
                    }
                    Err(err) => {
                        error!("timer handling returned a fatal error: {err}");
                        break Err(err);
                    }
                }
            }
        }
    };

    if result.is_ok() {
        info!("handshake driver exiting cleanly");
    }
    let _ = done.send(result);
}

fn apply_timer(current: Option<Duration>, directive: TimerDirective) -> Option<Duration> {
    match directive {
        TimerDirective::None => current,
        TimerDirective::Arm(duration) => Some(duration),
        TimerDirective::Cancel => None,
    }
}
