//! §9 Design Notes: a bounded byte buffer standing in for the source
//! implementation's fixed-capacity, trivially-copyable containers. Rust
//! has no equivalent zero-cost stack buffer with dynamic fill level in
//! std, so this wraps a `Vec<u8>` with an explicit capacity ceiling
//! instead of letting callers grow it unboundedly.

use crate::error::{Error, Result};

pub struct BoundedBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl BoundedBuffer {
    pub fn new(capacity: usize) -> Self {
        BoundedBuffer {
            data: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) -> Result<()> {
        if self.data.len() + bytes.len() > self.capacity {
            return Err(Error::ContainerCorrupted(
                "bounded buffer capacity exceeded".into(),
            ));
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn drain(&mut self, len: usize) -> Vec<u8> {
        let len = len.min(self.data.len());
        self.data.drain(..len).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
