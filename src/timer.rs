//! §4.6 / §9: a one-shot timer abstraction. The state machine core stays
//! synchronous and never blocks (§5), so it only ever asks "should a
//! timer be armed, and for how long" — actually waiting on the clock is
//! the `ProviderFacade`'s job.

use std::time::Duration;

/// What the state machine wants the facade to do with its timer after
/// handling an event. `Rearm` is used for DTLS retransmission (§4.6):
/// each timeout doubles the previous interval up to a cap, mirroring the
/// backoff RFC 6347 §4.2.4.1 recommends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimerDirective {
    None,
    Arm(Duration),
    Cancel,
}

/// Tracks one DTLS flight's retransmission schedule: the number of
/// retries attempted so far and the next backoff interval.
pub struct RetransmitSchedule {
    base_interval: Duration,
    max_retries: u32,
    attempts: u32,
}

impl RetransmitSchedule {
    pub fn new(base_interval: Duration, max_retries: u32) -> Self {
        RetransmitSchedule {
            base_interval,
            max_retries,
            attempts: 0,
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Call when the flight is first sent, to get the initial arm
    /// directive.
    pub fn initial(&self) -> TimerDirective {
        TimerDirective::Arm(self.base_interval)
    }

    /// Call when the timer fires: either the flight should be
    /// retransmitted with a longer timeout, or retries are exhausted and
    /// the handshake should fail (§4.6 "Retry budget exceeded").
    pub fn on_timeout(&mut self) -> Option<TimerDirective> {
        if self.attempts >= self.max_retries {
            return None;
        }
        self.attempts += 1;
        let backoff = self.base_interval * 2u32.pow(self.attempts.min(4));
        Some(TimerDirective::Arm(backoff))
    }
}
