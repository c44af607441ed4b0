//! This module provides cross-platform paths for the configuration file and
//! user patches.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/patchwire/` (Linux), `~/Library/Application Support/patchwire/` (macOS), `%APPDATA%\patchwire\` (Windows)
//! - **User patches**: the `patches/` subdirectory of the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use patchwire_config::paths;
//!
//! println!("Config file: {:?}", paths::config_file_path());
//!
//! // Find a patch by name (literal path first, then the user directory)
//! if let Some(path) = paths::find_patch("fat_bass") {
//!     println!("Found patch at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "patchwire";

/// Subdirectory name for patches.
const PATCHES_SUBDIR: &str = "patches";

/// Configuration file name.
const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific patches directory.
pub fn user_patches_dir() -> PathBuf {
    user_config_dir().join(PATCHES_SUBDIR)
}

/// Returns the path of the user configuration file.
pub fn config_file_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Find a patch file by name.
///
/// The name may be a path to an existing file, or a patch name (with or
/// without `.toml`) looked up in `dir`, defaulting to the user patches
/// directory.
pub fn find_patch(name: &str) -> Option<PathBuf> {
    find_patch_in(name, &user_patches_dir())
}

/// [`find_patch`] with an explicit patches directory.
pub fn find_patch_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{}.toml", name)
    };

    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    ensure_dir(user_config_dir())
}

/// Ensure the user patches directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_patches_dir() -> Result<PathBuf, crate::ConfigError> {
    ensure_dir(user_patches_dir())
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, crate::ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// List all patch files in the user patches directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_patches() -> Vec<PathBuf> {
    list_patches_in_dir(&user_patches_dir())
}

/// Patch files (`*.toml`) in `dir`, sorted by path.
pub fn list_patches_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut patches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    patches.sort();
    patches
}

/// Get the patch name from a file path.
///
/// # Example
///
/// ```rust
/// use patchwire_config::paths::patch_name_from_path;
/// use std::path::Path;
///
/// let name = patch_name_from_path(Path::new("/path/to/fat_bass.toml"));
/// assert_eq!(name, Some("fat_bass".to_string()));
/// ```
pub fn patch_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_paths_share_app_dir() {
        let config = user_config_dir();
        assert!(config.ends_with(APP_NAME));
        assert!(user_patches_dir().starts_with(&config));
        assert!(config_file_path().ends_with("patchwire/config.toml"));
    }

    #[test]
    fn test_find_patch_by_path_and_name() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("fat_bass.toml");
        fs::write(&file, "device = \"venom\"\nname = \"X\"\n").unwrap();

        let literal = file.to_string_lossy().into_owned();
        assert_eq!(find_patch_in(&literal, Path::new("/nonexistent")), Some(file.clone()));
        assert_eq!(find_patch_in("fat_bass", dir.path()), Some(file.clone()));
        assert_eq!(find_patch_in("fat_bass.toml", dir.path()), Some(file));
        assert_eq!(find_patch_in("other", dir.path()), None);
    }

    #[test]
    fn test_list_patches_in_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.toml"), "").unwrap();
        fs::write(dir.path().join("a.toml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub.toml")).unwrap();

        let names: Vec<String> = list_patches_in_dir(dir.path())
            .iter()
            .filter_map(|p| patch_name_from_path(p))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(list_patches_in_dir(&dir.path().join("missing")).is_empty());
    }
}
