//! Application Configuration
//!
//! User settings stored in TOML format. The OCR service credential can be
//! overridden from the environment so it never has to live in a checked-in
//! file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `recognition.api_key`
pub const API_KEY_ENV: &str = "SCANMARKET_OCR_API_KEY";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-recognition service settings
    pub recognition: RecognitionSettings,
    /// Product catalog settings
    pub catalog: CatalogSettings,
    /// Capture loop settings
    pub capture: CaptureSettings,
}

impl AppConfig {
    /// Apply environment overrides on top of the loaded file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.recognition.api_key = key;
            }
        }
    }
}

/// Settings for the remote text-recognition service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionSettings {
    /// Recognition endpoint URL
    pub endpoint: String,
    /// Service API key; usually supplied via the environment
    pub api_key: String,
    /// OCR language hint (e.g. "eng")
    pub language: String,
    /// Deadline for exploratory recognition during auto-scanning, in seconds
    pub scan_timeout_secs: u64,
    /// Deadline for the authoritative final pass, in seconds
    pub final_timeout_secs: u64,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.ocr.space/parse/image".to_string(),
            api_key: String::new(),
            language: "eng".to_string(),
            scan_timeout_secs: 3,
            final_timeout_secs: 30,
        }
    }
}

impl RecognitionSettings {
    /// Deadline used while the scan loop is still exploring frames
    pub fn scan_deadline(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    /// Deadline used for the high-fidelity pass over the frozen frame
    pub fn final_deadline(&self) -> Duration {
        Duration::from_secs(self.final_timeout_secs)
    }
}

/// Settings for the product catalog service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Catalog base URL
    pub base_url: String,
    /// Per-request timeout, in seconds
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Settings for the capture loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Interval between frame ticks, in milliseconds
    pub tick_interval_ms: u64,
    /// Minimum interval between recognition calls within one session,
    /// in milliseconds
    pub min_recognition_interval_ms: u64,
    /// Stop after this many exploratory recognition attempts (0 = unlimited)
    pub max_attempts: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 33,
            min_recognition_interval_ms: 2000,
            max_attempts: 0,
        }
    }
}

impl CaptureSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn min_recognition_interval(&self) -> Duration {
        Duration::from_millis(self.min_recognition_interval_ms)
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "scanmarket", "ScanMarket")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
