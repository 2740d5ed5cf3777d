//! Decrypted application traffic, opaque to the handshake layer. Only
//! delivered upward after `on_connected` has fired (§6).

use crate::content::ContentType;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationData(pub Vec<u8>);

impl ApplicationData {
    pub fn content_type(&self) -> ContentType {
        ContentType::ApplicationData
    }

    pub fn size(&self) -> usize {
        self.0.len()
    }
}
