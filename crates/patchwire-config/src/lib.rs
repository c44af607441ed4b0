//! Configuration and patch files for patchwire.
//!
//! This crate holds everything patchwire keeps on disk apart from raw
//! `.syx` data: the user configuration, patches stored as TOML, and the
//! checks that a stored patch fits its device.
//!
//! # Features
//!
//! - **Config**: default device, MIDI channel, device id and pause scaling
//! - **Patch Files**: device-independent TOML form of a [`Patch`](patchwire_core::Patch)
//! - **Validation**: parameter names, ranges and names against a device
//! - **Paths**: Platform-specific config and patch directories
//! - **Factory Patches**: Built-in starting patches for each device family
//!
//! # Example
//!
//! ```rust,no_run
//! use patchwire_config::{PatchFile, user_patches_dir};
//!
//! // Load a patch from file
//! let patch = PatchFile::load("bass.toml").unwrap();
//!
//! // Create a patch programmatically
//! let patch = PatchFile::new("venom", "Fat Bass")
//!     .with_description("Detuned saw bass")
//!     .with_param("osc1waveform", 3)
//!     .with_param("cutoff", 4200);
//!
//! // Save to user patches directory
//! let path = user_patches_dir().join("fat_bass.toml");
//! patch.save(&path).unwrap();
//! ```

mod config;
mod error;
mod patch_file;

/// Platform-specific paths for patches and configuration.
#[cfg(feature = "std")]
pub mod paths;

/// Patch file validation.
pub mod validation;

/// Factory patches bundled with the library.
pub mod factory_patches;

pub use config::Config;
pub use error::ConfigError;
pub use factory_patches::{factory_patch, factory_patch_names, factory_patches, factory_patches_for};
pub use patch_file::PatchFile;
#[cfg(feature = "std")]
pub use paths::{
    config_file_path, ensure_user_config_dir, ensure_user_patches_dir, find_patch,
    list_user_patches, patch_name_from_path, user_config_dir, user_patches_dir,
};
pub use validation::{ValidationError, ValidationResult, validate_patch, validate_patch_file};

/// Re-export commonly used types from patchwire-registry
pub use patchwire_registry::DeviceRegistry;
