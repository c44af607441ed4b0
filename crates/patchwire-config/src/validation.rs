//! This module checks a [`PatchFile`] against the device it names: the device
//! must exist, every parameter must be one of the codec's keys and within
//! its range, and the name must fit the device.
//!
//! # Example
//!
//! ```rust
//! use patchwire_config::{DeviceRegistry, PatchFile, validate_patch_file};
//!
//! let registry = DeviceRegistry::new();
//! let file = PatchFile::new("fb01", "BASS").with_param("algorithm", 4);
//! validate_patch_file(&file, &registry).expect("valid patch");
//! ```

use patchwire_core::{DeviceSettings, RangeMap};
use patchwire_registry::DeviceRegistry;
use thiserror::Error;

use crate::PatchFile;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Unknown device id.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// Unknown parameter key.
    #[error("unknown parameter '{param}' for device '{device}'")]
    UnknownParameter {
        /// Device id.
        device: String,
        /// The unrecognized key.
        param: String,
    },

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter key.
        param: String,
        /// The value that was out of range.
        value: i32,
        /// Minimum allowed value.
        min: i32,
        /// Maximum allowed value.
        max: i32,
    },

    /// Name the device cannot store.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The name.
        name: String,
        /// Why it is rejected.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate `file` against explicit ranges and a name length.
///
/// All problems are reported: one problem comes back as itself, several as
/// [`ValidationError::Multiple`].
pub fn validate_patch(file: &PatchFile, ranges: &RangeMap, name_len: usize) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if file.name.chars().count() > name_len {
        errors.push(ValidationError::InvalidName {
            name: file.name.clone(),
            reason: format!("longer than {name_len} characters"),
        });
    }
    if let Some(c) = file.name.chars().find(|c| !(' '..='\u{7F}').contains(c)) {
        errors.push(ValidationError::InvalidName {
            name: file.name.clone(),
            reason: format!("character {c:?} is not printable ASCII"),
        });
    }

    for (key, &value) in &file.params {
        match ranges.get(key) {
            None => errors.push(ValidationError::UnknownParameter {
                device: file.device.clone(),
                param: key.clone(),
            }),
            Some(range) if !range.contains(value) => errors.push(ValidationError::OutOfRange {
                param: key.clone(),
                value,
                min: range.min,
                max: range.max,
            }),
            Some(_) => {}
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Validate `file` against the codec of the device it names.
pub fn validate_patch_file(file: &PatchFile, registry: &DeviceRegistry) -> ValidationResult<()> {
    let codec = registry
        .create(&file.device, &DeviceSettings::default())
        .ok_or_else(|| ValidationError::UnknownDevice(file.device.clone()))?;
    validate_patch(file, codec.ranges(), codec.descriptor().name_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwire_core::ParamRange;

    fn ranges() -> RangeMap {
        RangeMap::new(
            ["cutoff", "resonance"],
            0,
            127,
            &[ParamRange::new("cutoff", 0, 16383)],
        )
    }

    #[test]
    fn test_valid_patch() {
        let file = PatchFile::new("venom", "Fat Bass")
            .with_param("cutoff", 9000)
            .with_param("resonance", 127);
        assert_eq!(validate_patch(&file, &ranges(), 10), Ok(()));
    }

    #[test]
    fn test_single_error_is_not_wrapped() {
        let file = PatchFile::new("venom", "Bass").with_param("resonance", 128);
        assert_eq!(
            validate_patch(&file, &ranges(), 10),
            Err(ValidationError::OutOfRange {
                param: "resonance".to_string(),
                value: 128,
                min: 0,
                max: 127,
            })
        );
    }

    #[test]
    fn test_errors_aggregate() {
        let file = PatchFile::new("venom", "Much Too Long Name")
            .with_param("cutoff", -1)
            .with_param("wobble", 3);
        let Err(ValidationError::Multiple(errors)) = validate_patch(&file, &ranges(), 10) else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::InvalidName { .. }));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::UnknownParameter { param, .. } if param == "wobble"))
        );
        let msg = ValidationError::Multiple(errors).to_string();
        assert!(msg.contains("out of range"), "got: {msg}");
    }

    #[test]
    fn test_non_ascii_name() {
        let file = PatchFile::new("venom", "Bäss");
        assert!(matches!(
            validate_patch(&file, &ranges(), 10),
            Err(ValidationError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_against_registry() {
        let registry = DeviceRegistry::new();

        let ok = PatchFile::new("fb01", "BASS").with_param("op1level", 100);
        assert_eq!(validate_patch_file(&ok, &registry), Ok(()));

        let long = PatchFile::new("fb01", "LONG NAME");
        assert!(matches!(
            validate_patch_file(&long, &registry),
            Err(ValidationError::InvalidName { .. })
        ));

        let unknown = PatchFile::new("dx7", "X");
        assert_eq!(
            validate_patch_file(&unknown, &registry),
            Err(ValidationError::UnknownDevice("dx7".to_string()))
        );
    }
}
