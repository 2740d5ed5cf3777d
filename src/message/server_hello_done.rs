//! RFC 5246 §7.4.5: a zero-length marker closing the server's first flight.

use std::io::{Read, Write};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct ServerHelloDone;

impl ServerHelloDone {
    pub fn marshal<W: Write>(&self, _writer: &mut W) -> Result<()> {
        Ok(())
    }

    pub fn unmarshal<R: Read>(_reader: &mut R) -> Result<Self> {
        Ok(ServerHelloDone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshals_to_zero_bytes() {
        let mut buf = Vec::new();
        ServerHelloDone.marshal(&mut buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(ServerHelloDone::unmarshal(&mut buf.as_slice()).unwrap(), ServerHelloDone);
    }
}
