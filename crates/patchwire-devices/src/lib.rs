//! Patchwire Devices - SysEx codecs for supported synthesizers
//!
//! Each module implements [`SysexCodec`](patchwire_core::SysexCodec) for one
//! device family:
//!
//! - [`venom`] - M-Audio Venom single, multi, arpeggiator pattern and
//!   global dumps (7-bit packed)
//! - [`yamaha4op`] - DX21, DX27/DX100, TX81Z, DX11, TQ5 and V50 voices
//!   (VCED/ACED/ACED2/ACED3/EFEDS frame groups and VMEM banks), plus
//!   TX81Z and DX11 performances (PCED and PMEM)
//! - [`fb01`] - Yamaha FB-01 voices and voice banks (nibblized data)
//!
//! ## Example
//!
//! ```rust
//! use patchwire_core::{Destination, ParameterModel, SysexCodec};
//! use patchwire_devices::venom::Venom;
//!
//! let venom = Venom::default();
//! let mut patch = venom.init_patch();
//! patch.set("resonance", 90);
//!
//! let messages = venom.emit(&patch, Destination::WorkingMemory);
//! let bytes = messages[0].to_bytes();
//! let (outcome, decoded) = venom.parse(&bytes);
//! assert!(outcome.is_success());
//! assert_eq!(decoded.get("resonance"), Some(90));
//! ```

pub mod fb01;
pub mod venom;
pub mod yamaha4op;

pub use fb01::Fb01;
pub use venom::{Venom, VenomArp, VenomGlobal, VenomMulti};
pub use yamaha4op::{PerformanceModel, Yamaha4Op, Yamaha4OpModel, Yamaha4OpPerformance};
