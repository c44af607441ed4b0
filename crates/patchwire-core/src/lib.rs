//! Patchwire Core - MIDI System Exclusive codec primitives
//!
//! This crate holds everything the device codecs share: the byte-level
//! transforms, the patch model, and the codec contract.
//!
//! # Byte Transforms
//!
//! - [`seven_bit`] - 8-bit ↔ 7-bit payload packing ("nibblizing")
//! - [`nibble`] - low-first nibble splitting
//! - [`checksum`] - additive 7-bit checksums
//! - [`bits`] - bit fields and flag-byte layouts
//! - [`frame`] - frame splitting, signatures, and construction
//!
//! # Model
//!
//! - [`Patch`] / [`ParameterModel`] - string-keyed parameter values
//! - [`ParameterTable`] - ordered native slot layout
//! - [`RangeMap`] / [`name_from_list`] - value ranges and display
//!
//! # Codec Contract
//!
//! - [`SysexCodec`] - parse, emit, requests, timing, revision
//! - [`BankCodec`] - whole-bank dumps
//! - [`DeviceDescriptor`] / [`Quirk`] - static device data
//!
//! # no_std Support
//!
//! The crate is `no_std` + `alloc` compatible. Disable the default `std`
//! feature:
//!
//! ```toml
//! [dependencies]
//! patchwire-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use patchwire_core::{checksum, seven_bit};
//!
//! let payload = seven_bit::pack(&[0x80, 0x01, 0xFF]);
//! assert!(payload.iter().all(|&b| b <= 0x7F));
//!
//! let mut body = vec![0x02, 0x09];
//! body.push(checksum::checksum(&body));
//! assert!(checksum::verify(&body));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod bits;
pub mod checksum;
pub mod codec;
pub mod device;
pub mod error;
pub mod frame;
pub mod model;
pub mod nibble;
pub mod param_table;
pub mod seven_bit;

pub use bits::{BitField, FlagLayout};
pub use codec::{
    BankCodec, Destination, Message, ParseOutcome, SysexCodec, Timing, name_from_bytes,
    padded_name_bytes, revise_standard, sanitize_name, sysex_bytes,
};
pub use device::{DeviceDescriptor, DeviceFamily, DeviceSettings, Quirk};
pub use error::CodecError;
pub use frame::{FrameBuilder, SYSEX_END, SYSEX_START, Signature, split_frames};
pub use model::{ParameterModel, Patch, PatchLocation};
pub use param_table::{
    ParamRange, ParameterTable, RESERVED, RangeMap, name_from_list,
};
