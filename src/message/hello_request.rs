//! RFC 5246 §7.4.1.1: a zero-length nudge asking the peer to renegotiate.
//! Never included in any Finished transcript (§4.1 edge case).

use std::io::{Read, Write};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct HelloRequest;

impl HelloRequest {
    pub fn marshal<W: Write>(&self, _writer: &mut W) -> Result<()> {
        Ok(())
    }

    pub fn unmarshal<R: Read>(_reader: &mut R) -> Result<Self> {
        Ok(HelloRequest)
    }
}
