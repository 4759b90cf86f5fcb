/// User settings
///
/// Settings are read from `settings.json` in the user's config directory:
/// - Linux: ~/.config/property-viewer/settings.json
/// - macOS: ~/Library/Application Support/property-viewer/settings.json
/// - Windows: %APPDATA%\property-viewer\settings.json
///
/// Every field is optional; anything missing falls back to the defaults
/// below.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Photo service URL. `{mls}`, `{n}`, `{w}` and `{h}` are substituted
/// with the listing number, photo index and requested size.
pub const DEFAULT_PHOTO_URL: &str = "http://media.mlspin.com/photo.aspx?mls={mls}&n={n}&w={w}&h={h}";

/// Name of the ZIP reference file in the resource directory
pub const ZIP_FILE_NAME: &str = "zipcode.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Photo service URL template
    pub photo_url_template: String,
    /// Table thumbnails are fitted inside this square (px)
    pub thumbnail_size: u32,
    /// Width/height requested from the photo service for thumbnails (px)
    pub thumbnail_request_size: u32,
    /// Gallery photos are requested at and fitted inside this square (px)
    pub gallery_size: u32,
    /// Upper bound on photo indices probed for one listing
    pub gallery_max_photos: usize,
    /// Concurrent photo downloads
    pub fetch_workers: usize,
    /// Per-request network timeout in seconds
    pub request_timeout_secs: u64,
    /// ZIP reference file; defaults to `zipcode.txt` next to the executable
    pub zip_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            photo_url_template: DEFAULT_PHOTO_URL.to_string(),
            thumbnail_size: 100,
            thumbnail_request_size: 150,
            gallery_size: 300,
            gallery_max_photos: 50,
            fetch_workers: 6,
            request_timeout_secs: 5,
            zip_file: None,
        }
    }
}

impl Settings {
    /// Load settings from the user's config directory, falling back to
    /// defaults when the file is missing or invalid.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(Some(settings)) => {
                info!("⚙️  Settings loaded from {}", path.display());
                settings
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("⚠️  Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Read a settings file. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Get the path where the settings file lives
    fn settings_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("property-viewer");
        path.push("settings.json");
        Some(path)
    }

    /// Path of the ZIP reference file
    pub fn zip_path(&self) -> PathBuf {
        self.zip_file
            .clone()
            .unwrap_or_else(|| resource_dir().join(ZIP_FILE_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Worker count, never zero
    pub fn workers(&self) -> usize {
        self.fetch_workers.max(1)
    }
}

/// Directory holding the executable, where bundled resources live.
/// Falls back to the working directory.
pub fn resource_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fetch_workers": 2, "zip_file": "/tmp/zips.txt" }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap().unwrap();
        assert_eq!(settings.fetch_workers, 2);
        assert_eq!(settings.zip_path(), PathBuf::from("/tmp/zips.txt"));
        assert_eq!(settings.thumbnail_size, 100);
        assert_eq!(settings.photo_url_template, DEFAULT_PHOTO_URL);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.workers(), 6);
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert!(settings.zip_path().ends_with(ZIP_FILE_NAME));

        let zero = Settings {
            fetch_workers: 0,
            ..Settings::default()
        };
        assert_eq!(zero.workers(), 1);
    }
}
