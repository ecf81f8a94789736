//! Application Configuration
//!
//! JSON settings file with serde defaults and a tolerant `normalize()`
//! pass: bad values are corrected instead of failing so an old or edited
//! config never bricks the pipeline. Every field can be overridden with a
//! `LYRICFORGE_*` environment variable.
//!
//! Storage location: `{config_dir}/lyricforge/config.json`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings file name
pub const CONFIG_FILE: &str = "config.json";

/// Default render deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default object-store folder for rendered outputs
pub const DEFAULT_OUTPUT_FOLDER: &str = "lyricforge/outputs";

// =============================================================================
// Sections
// =============================================================================

/// Render pipeline settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Scratch directory for per-request input/output files;
    /// `None` uses the platform temp directory
    pub scratch_dir: Option<PathBuf>,
    /// Wall-clock deadline for the renderer invocation
    pub timeout_secs: u64,
    /// Object-store folder for rendered outputs
    pub output_folder: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_folder: DEFAULT_OUTPUT_FOLDER.to_string(),
        }
    }
}

impl RenderConfig {
    /// Effective scratch directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Object store connection settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectStoreConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name: String::new(),
            upload_preset: String::new(),
        }
    }
}

/// Project store connection settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectStoreConfig {
    pub base_url: String,
}

// =============================================================================
// Aggregate
// =============================================================================

/// Application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub object_store: ObjectStoreConfig,
    /// Optional: the project store is a first-class optional capability
    pub project_store: Option<ProjectStoreConfig>,
}

impl AppConfig {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lyricforge").join(CONFIG_FILE))
    }

    /// Loads from the default location, then applies environment
    /// overrides and normalization. A missing file yields defaults.
    pub fn load() -> Self {
        let mut config = Self::default_path()
            .filter(|p| p.exists())
            .map(|p| Self::from_file(&p))
            .unwrap_or_default();
        config.apply_env();
        config.normalize();
        config
    }

    /// Loads from an explicit file, falling back to defaults on any
    /// read/parse failure.
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Applies `LYRICFORGE_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("LYRICFORGE_CLOUD_NAME") {
            self.object_store.cloud_name = value;
        }
        if let Ok(value) = std::env::var("LYRICFORGE_UPLOAD_PRESET") {
            self.object_store.upload_preset = value;
        }
        if let Ok(value) = std::env::var("LYRICFORGE_OBJECT_STORE_URL") {
            self.object_store.base_url = value;
        }
        if let Ok(value) = std::env::var("LYRICFORGE_PROJECT_STORE_URL") {
            self.project_store = Some(ProjectStoreConfig { base_url: value });
        }
        if let Ok(value) = std::env::var("LYRICFORGE_TIMEOUT_SECS") {
            match value.parse() {
                Ok(secs) => self.render.timeout_secs = secs,
                Err(_) => warn!("ignoring non-numeric LYRICFORGE_TIMEOUT_SECS={}", value),
            }
        }
        if let Ok(value) = std::env::var("LYRICFORGE_OUTPUT_FOLDER") {
            self.render.output_folder = value;
        }
    }

    /// Normalizes and clamps settings so loaded state is always usable.
    pub fn normalize(&mut self) {
        self.render.timeout_secs = self.render.timeout_secs.clamp(1, 3600);
        if self.render.output_folder.trim().is_empty() {
            self.render.output_folder = DEFAULT_OUTPUT_FOLDER.to_string();
        }
        self.object_store.base_url = self.object_store.base_url.trim_end_matches('/').to_string();
        if let Some(store) = &mut self.project_store {
            store.base_url = store.base_url.trim_end_matches('/').to_string();
            // An empty project store section means "not configured".
            if store.base_url.is_empty() {
                self.project_store = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.render.timeout_secs, 120);
        assert_eq!(config.render.output_folder, "lyricforge/outputs");
        assert!(config.project_store.is_none());
        assert!(config.object_store.base_url.starts_with("https://"));
    }

    #[test]
    fn test_normalize_clamps_timeout() {
        let mut config = AppConfig::default();
        config.render.timeout_secs = 0;
        config.normalize();
        assert_eq!(config.render.timeout_secs, 1);

        config.render.timeout_secs = 999_999;
        config.normalize();
        assert_eq!(config.render.timeout_secs, 3600);
    }

    #[test]
    fn test_normalize_drops_empty_project_store() {
        let mut config = AppConfig::default();
        config.project_store = Some(ProjectStoreConfig {
            base_url: "/".to_string(),
        });
        config.normalize();
        assert!(config.project_store.is_none());
    }

    #[test]
    fn test_from_file_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"render":{"timeoutSecs":30}}"#).unwrap();

        let config = AppConfig::from_file(&path);
        assert_eq!(config.render.timeout_secs, 30);
        assert_eq!(config.render.output_folder, "lyricforge/outputs");
    }

    #[test]
    fn test_from_file_corrupt_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let config = AppConfig::from_file(&path);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_scratch_dir_defaults_to_temp() {
        let config = RenderConfig::default();
        assert_eq!(config.scratch_dir(), std::env::temp_dir());

        let explicit = RenderConfig {
            scratch_dir: Some(PathBuf::from("/scratch")),
            ..RenderConfig::default()
        };
        assert_eq!(explicit.scratch_dir(), PathBuf::from("/scratch"));
    }
}
