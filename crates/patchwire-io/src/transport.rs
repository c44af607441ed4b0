//! Pluggable SysEx transport.
//!
//! The [`SysexTransport`] trait separates message sequencing from the
//! platform MIDI API. Live port handling stays outside this crate; an
//! application implements the trait over whatever output it opened.
//! [`MemoryTransport`] records everything it is given, for tests and for
//! rendering a send sequence to a file.

use crate::Result;

/// Destination for raw MIDI bytes.
///
/// Each call carries one complete message: a whole SysEx frame or a
/// two-byte program change.
pub trait SysexTransport {
    /// Send one message.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<T: SysexTransport + ?Sized> SysexTransport for &mut T {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }
}

impl<T: SysexTransport + ?Sized> SysexTransport for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }
}

/// Transport that keeps every sent message.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Vec<Vec<u8>>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in send order.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// All sent bytes concatenated.
    pub fn bytes(&self) -> Vec<u8> {
        self.sent.concat()
    }

    /// Takes the recorded messages, leaving the transport empty.
    pub fn take(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }
}

impl SysexTransport for MemoryTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.sent.push(bytes.to_vec());
        Ok(())
    }
}
