//! SysEx file and transport layer for patchwire.
//!
//! This crate provides:
//!
//! - **`.syx` file I/O**: [`read_syx`], [`read_frames`] and [`write_syx`]
//! - **Inventory**: [`syx_info`] for frame offsets and stray bytes
//! - **Transport**: the [`SysexTransport`] trait and [`MemoryTransport`]
//! - **Sending**: [`Sender`] plays codec message lists with device pauses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use patchwire_core::{Destination, SysexCodec};
//! use patchwire_devices::Venom;
//! use patchwire_io::{MemoryTransport, Sender, read_frames};
//!
//! // Load a dump
//! let frames = read_frames("patch.syx")?;
//! let venom = Venom::default();
//! let (_, patch) = venom.parse(&frames[0]);
//!
//! // Play it back to a device
//! let mut sender = Sender::new(MemoryTransport::new(), venom.timing());
//! sender.send_all(&venom.emit(&patch, Destination::WorkingMemory))?;
//! ```

mod sender;
mod syx;
mod transport;

pub use sender::{Sender, Sleeper};
pub use syx::{FrameInfo, SyxInfo, read_frames, read_syx, syx_info, write_syx};
pub use transport::{MemoryTransport, SysexTransport};

/// Error types for SysEx I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The data held no complete SysEx frame.
    #[error("No SysEx frames found")]
    NoFrames,

    /// The transport refused or failed a send.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Convenience result type for SysEx I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
