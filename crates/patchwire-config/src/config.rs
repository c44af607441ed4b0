//! User configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use patchwire_core::DeviceSettings;
use patchwire_registry::DeviceRegistry;
use tracing::debug;

use crate::error::ConfigError;

/// Settings shared by every command.
///
/// # TOML Format
///
/// ```toml
/// device = "tx81z"
/// channel = 0
/// device_id = 16
/// pause_scale = 1.5
/// patches_dir = "/home/me/patches"
/// ```
///
/// Every key is optional; missing keys take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Registry id of the device to talk to.
    pub device: String,

    /// MIDI channel, 0..=15.
    pub channel: u8,

    /// Device id override. Codecs use their own default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u8>,

    /// Multiplier for every pause a codec asks for.
    pub pause_scale: f64,

    /// Directory for patch files, instead of the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patches_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: "venom".to_string(),
            channel: 0,
            device_id: None,
            pause_scale: 1.0,
            patches_dir: None,
        }
    }
}

impl Config {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load the user's configuration file, or the defaults.
    #[cfg(feature = "std")]
    pub fn load_user() -> Result<Self, ConfigError> {
        Self::load_or_default(crate::paths::config_file_path())
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
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

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Codec settings for this configuration.
    pub fn settings(&self) -> DeviceSettings {
        DeviceSettings {
            channel: self.channel & 0x0F,
            device_id: self.device_id,
        }
    }

    /// Checks the device id against `registry` and the channel range.
    pub fn validate(&self, registry: &DeviceRegistry) -> Result<(), ConfigError> {
        if registry.get(&self.device).is_none() {
            return Err(ConfigError::UnknownDevice(self.device.clone()));
        }
        if self.channel > 15 {
            return Err(ConfigError::InvalidChannel(self.channel));
        }
        Ok(())
    }

    /// Directory patch files are kept in.
    #[cfg(feature = "std")]
    pub fn patches_dir(&self) -> PathBuf {
        self.patches_dir
            .clone()
            .unwrap_or_else(crate::paths::user_patches_dir)
    }
}
