//! §4.2 HandshakeAggregator: turns inbound record-layer bytes into
//! complete [`Handshake`] messages. TLS records stream handshake bytes
//! across record boundaries (peek a 12-byte header, wait for the body);
//! DTLS instead reassembles out-of-order fragments of a single message,
//! grounded on the teacher's `fragment_buffer/mod.rs` (HashMap<u16,
//! Vec<Fragment>>, recursive `append_message`, overflow bound).

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::message::handshake_header::{HandshakeHeader, HANDSHAKE_HEADER_LENGTH};
use crate::message::{Handshake, HandshakeType};

/// Mirrors the teacher's `FRAGMENT_BUFFER_MAX_SIZE`: a ceiling on how much
/// unreassembled fragment data one message_sequence may accumulate before
/// the aggregator gives up and reports corruption rather than buffering
/// unboundedly for a peer that never completes a message.
const FRAGMENT_BUFFER_MAX_SIZE: usize = 2 * 1024 * 1024;

struct Fragment {
    offset: u32,
    data: Vec<u8>,
}

struct PendingMessage {
    handshake_type: HandshakeType,
    total_length: u32,
    fragments: Vec<Fragment>,
    buffered_bytes: usize,
}

impl PendingMessage {
    fn received_length(&self) -> u32 {
        // Fragments may arrive out of order and overlapping; track
        // coverage by simple interval union since message sizes here are
        // small (bounded by FRAGMENT_BUFFER_MAX_SIZE).
        let mut covered = vec![false; self.total_length as usize];
        for frag in &self.fragments {
            let start = frag.offset as usize;
            let end = start + frag.data.len();
            let covered_len = covered.len();
            for slot in covered.iter_mut().take(end.min(covered_len)).skip(start) {
                *slot = true;
            }
        }
        covered.iter().filter(|c| **c).count() as u32
    }

    fn is_complete(&self) -> bool {
        self.received_length() == self.total_length
    }

    fn assemble(&self) -> Vec<u8> {
        let mut body = vec![0u8; self.total_length as usize];
        for frag in &self.fragments {
            let start = frag.offset as usize;
            let end = (start + frag.data.len()).min(body.len());
            body[start..end].copy_from_slice(&frag.data[..end - start]);
        }
        body
    }
}

/// The streaming (TLS) half keeps only the bytes it hasn't yet been able
/// to split into a full handshake message.
#[derive(Default)]
struct StreamAssembler {
    buffer: Vec<u8>,
}

impl StreamAssembler {
    fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn pop_complete(&mut self) -> Result<Option<(HandshakeHeader, Vec<u8>)>> {
        if self.buffer.len() < HANDSHAKE_HEADER_LENGTH {
            return Ok(None);
        }
        let header = HandshakeHeader::unmarshal(&mut &self.buffer[..])?;
        let total = HANDSHAKE_HEADER_LENGTH + header.length as usize;
        if self.buffer.len() < total {
            return Ok(None);
        }
        let body = self.buffer[HANDSHAKE_HEADER_LENGTH..total].to_vec();
        self.buffer.drain(..total);
        Ok(Some((header, body)))
    }
}

/// Out-of-order fragment reassembly for DTLS (RFC 6347 §4.2.2), keyed by
/// `message_sequence` as the teacher's `FragmentBuffer` does.
#[derive(Default)]
struct FragmentAssembler {
    pending: HashMap<u16, PendingMessage>,
}

impl FragmentAssembler {
    fn push(&mut self, header: HandshakeHeader, fragment_body: &[u8]) -> Result<()> {
        let entry = self.pending.entry(header.message_sequence).or_insert_with(|| PendingMessage {
            handshake_type: header.handshake_type,
            total_length: header.length,
            fragments: Vec::new(),
            buffered_bytes: 0,
        });

        if entry.handshake_type != header.handshake_type || entry.total_length != header.length {
            return Err(Error::ContainerCorrupted(
                "conflicting fragment headers for the same message_sequence".into(),
            ));
        }

        entry.buffered_bytes += fragment_body.len();
        if entry.buffered_bytes > FRAGMENT_BUFFER_MAX_SIZE {
            return Err(Error::ContainerCorrupted(
                "fragment buffer exceeded its size bound".into(),
            ));
        }

        entry.fragments.push(Fragment {
            offset: header.fragment_offset,
            data: fragment_body.to_vec(),
        });

        Ok(())
    }

    /// If the collector for `seq` is complete, removes it and returns its
    /// handshake type and reassembled body.
    fn take_complete(&mut self, seq: u16) -> Option<(HandshakeType, Vec<u8>)> {
        let is_complete = self.pending.get(&seq).map(PendingMessage::is_complete).unwrap_or(false);
        if !is_complete {
            return None;
        }
        let entry = self.pending.remove(&seq)?;
        Some((entry.handshake_type, entry.assemble()))
    }
}

/// What the aggregator hands back to the state machine after it consumes
/// one chunk of inbound handshake-content bytes. `CompleteMessage` may be
/// emitted multiple times from a single call (TLS can pack several
/// messages into one flight; DTLS resolves one message per datagram but
/// a retransmitted flight can still queue several).
pub enum AggregatorEvent {
    CompleteMessage(Handshake),
    /// A completed message carried a `message_sequence` this aggregator
    /// has already delivered: a retransmit, not a new message (§4.6).
    DuplicateMessage,
}

pub struct HandshakeAggregator {
    is_dtls: bool,
    is_psk: bool,
    stream: StreamAssembler,
    fragments: FragmentAssembler,
    next_expected_sequence: u16,
}

impl HandshakeAggregator {
    pub fn new(is_dtls: bool, is_psk: bool) -> Self {
        HandshakeAggregator {
            is_dtls,
            is_psk,
            stream: StreamAssembler::default(),
            fragments: FragmentAssembler::default(),
            next_expected_sequence: 0,
        }
    }

    pub fn set_is_psk(&mut self, is_psk: bool) {
        self.is_psk = is_psk;
    }

    /// Feed raw handshake-content-type bytes from one record. Returns
    /// every message that became complete as a result, in arrival order.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<AggregatorEvent>> {
        if self.is_dtls {
            self.push_dtls(data)
        } else {
            self.push_tls(data)
        }
    }

    fn push_tls(&mut self, data: &[u8]) -> Result<Vec<AggregatorEvent>> {
        self.stream.push(data);
        let mut events = Vec::new();
        while let Some((header, body)) = self.stream.pop_complete()? {
            let message = crate::message::HandshakeMessage::unmarshal_body(
                header.handshake_type,
                &mut body.as_slice(),
                false,
                self.is_psk,
            )?;
            events.push(AggregatorEvent::CompleteMessage(Handshake { header, message }));
        }
        Ok(events)
    }

    fn push_dtls(&mut self, data: &[u8]) -> Result<Vec<AggregatorEvent>> {
        if data.len() < HANDSHAKE_HEADER_LENGTH {
            return Err(Error::AlertDecodeError("dtls fragment too short".into()));
        }
        let header = HandshakeHeader::unmarshal(&mut &data[..])?;
        let fragment_body = &data[HANDSHAKE_HEADER_LENGTH..];
        if fragment_body.len() as u32 != header.fragment_length {
            return Err(Error::AlertDecodeError(
                "dtls fragment_length does not match payload".into(),
            ));
        }

        if header.message_sequence < self.next_expected_sequence {
            return Ok(vec![AggregatorEvent::DuplicateMessage]);
        }

        self.fragments.push(header, fragment_body)?;

        let mut events = Vec::new();
        while let Some((handshake_type, body)) = self.fragments.take_complete(self.next_expected_sequence) {
            let message = crate::message::HandshakeMessage::unmarshal_body(
                handshake_type,
                &mut body.as_slice(),
                true,
                self.is_psk,
            )?;
            let complete_header = HandshakeHeader {
                handshake_type,
                length: body.len() as u32,
                message_sequence: self.next_expected_sequence,
                fragment_offset: 0,
                fragment_length: body.len() as u32,
            };
            events.push(AggregatorEvent::CompleteMessage(Handshake {
                header: complete_header,
                message,
            }));
            self.next_expected_sequence = self.next_expected_sequence.wrapping_add(1);
        }
        Ok(events)
    }

    pub fn reset(&mut self) {
        self.stream = StreamAssembler::default();
        self.fragments = FragmentAssembler::default();
        self.next_expected_sequence = 0;
    }
}
