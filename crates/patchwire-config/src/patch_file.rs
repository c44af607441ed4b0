//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use patchwire_core::{ParameterModel, Patch, PatchLocation};

use crate::error::ConfigError;

/// A patch stored as TOML.
///
/// Parameter keys are the codec's model keys. A file need not list every
/// key: [`apply_to`](Self::apply_to) overlays the listed values on a patch
/// that already holds the rest, usually the device's init patch.
///
/// # TOML Format
///
/// ```toml
/// device = "venom"
/// name = "Fat Bass"
/// bank = 2
/// number = 17
/// description = "Detuned saw bass"
///
/// [params]
/// cutoff = 4200
/// osc1waveform = 3
/// resonance = 40
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchFile {
    /// Registry id of the device the patch belongs to.
    pub device: String,

    /// Patch name.
    pub name: String,

    /// Bank the patch came from or is headed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<u8>,

    /// Number within the bank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter values by key.
    #[serde(default)]
    pub params: BTreeMap<String, i32>,
}

impl PatchFile {
    /// Create an empty patch file.
    pub fn new(device: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            name: name.into(),
            bank: None,
            number: None,
            description: None,
            params: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the bank and number.
    pub fn with_location(mut self, location: PatchLocation) -> Self {
        self.bank = Some(location.bank);
        self.number = Some(location.number);
        self
    }

    /// Set one parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: i32) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Patch file holding every value of `patch`.
    pub fn from_patch(device: impl Into<String>, patch: &Patch) -> Self {
        let mut file = Self::new(device, patch.name());
        if let Some(location) = patch.location() {
            file = file.with_location(location);
        }
        file.params = patch.values().map(|(k, v)| (k.to_string(), v)).collect();
        file
    }

    /// Patch holding only the values listed in the file.
    pub fn to_patch(&self) -> Patch {
        let mut patch = Patch::new(&self.name);
        self.apply_to(&mut patch);
        patch
    }

    /// Overlays the file's name, location and values on `patch`.
    pub fn apply_to(&self, patch: &mut Patch) {
        patch.set_name(&self.name);
        if let Some(location) = self.location() {
            patch.set_location(Some(location));
        }
        for (key, value) in &self.params {
            patch.set(key, *value);
        }
    }

    /// Bank and number, when both are present.
    pub fn location(&self) -> Option<PatchLocation> {
        Some(PatchLocation::new(self.bank?, self.number?))
    }

    /// Load a patch file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a patch file from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the patch file to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of parameters listed.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when no parameters are listed.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builder() {
        let file = PatchFile::new("fb01", "BASS 1")
            .with_description("Slap")
            .with_location(PatchLocation::new(1, 12))
            .with_param("algorithm", 4)
            .with_param("op1level", 100);
        assert_eq!(file.len(), 2);
        assert_eq!(file.location(), Some(PatchLocation::new(1, 12)));
        assert_eq!(file.description.as_deref(), Some("Slap"));
    }

    #[test]
    fn test_location_needs_both_fields() {
        let mut file = PatchFile::new("venom", "X");
        file.bank = Some(1);
        assert_eq!(file.location(), None);
    }

    #[test]
    fn test_patch_conversion() {
        let patch = Patch::new("Fat Bass")
            .with("cutoff", 4200)
            .with("resonance", 40)
            .with_location(PatchLocation::new(2, 17));
        let file = PatchFile::from_patch("venom", &patch);
        assert_eq!(file.bank, Some(2));
        assert_eq!(file.params.get("cutoff"), Some(&4200));
        assert_eq!(file.to_patch(), patch);
    }

    #[test]
    fn test_apply_overlays_values() {
        let mut base = Patch::new("Init").with("cutoff", 100).with("resonance", 0);
        PatchFile::new("venom", "Lead")
            .with_param("resonance", 90)
            .apply_to(&mut base);
        assert_eq!(base.name(), "Lead");
        assert_eq!(base.get("cutoff"), Some(100));
        assert_eq!(base.get("resonance"), Some(90));
        assert_eq!(base.location(), None);
    }

    #[test]
    fn test_toml_format() {
        let toml_str = r#"
device = "venom"
name = "Fat Bass"
bank = 2
number = 17

[params]
cutoff = 4200
osc1waveform = 3
"#;
        let file = PatchFile::from_toml(toml_str).unwrap();
        assert_eq!(file.device, "venom");
        assert_eq!(file.location(), Some(PatchLocation::new(2, 17)));
        assert_eq!(file.params.get("osc1waveform"), Some(&3));
        assert!(file.description.is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patches").join("bass.toml");

        let file = PatchFile::new("tx81z", "E.PIANO 1")
            .with_param("algorithm", 4)
            .with_param("feedback", 0);
        file.save(&path).unwrap();
        assert_eq!(PatchFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = PatchFile::load(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
