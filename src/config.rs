//! Configuration management for frame capture.
//!
//! Loads configuration from TOML files and provides runtime defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub encoding: EncodingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            capture: CaptureConfig::default(),
            discovery: DiscoveryConfig::default(),
            encoding: EncodingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// URL prefixes admitted for capture; empty means match everything
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Byte length a non-root frame body must exceed to be kept
    #[serde(default = "default_min_fragment_len")]
    pub min_fragment_len: usize,

    /// Recursion cap for the frame walk
    #[serde(default = "default_max_frame_depth")]
    pub max_frame_depth: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            whitelist: Vec::new(),
            min_fragment_len: 100,
            max_frame_depth: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Use shell-hosted enumeration (native window scanning otherwise)
    #[serde(default = "default_true")]
    pub use_shell: bool,

    /// Window classes probed by the native-window strategy
    #[serde(default = "default_window_classes")]
    pub window_classes: Vec<String>,

    /// Bounded wait per candidate window for document retrieval
    #[serde(default = "default_document_timeout")]
    pub document_timeout_ms: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            use_shell: true,
            window_classes: default_window_classes(),
            document_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// WHATWG label of the source code page captured bodies arrive in
    #[serde(default = "default_source_encoding")]
    pub source: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            source: default_source_encoding(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_fragment_len() -> usize {
    100
}

fn default_max_frame_depth() -> usize {
    32
}

fn default_window_classes() -> Vec<String> {
    vec!["IEFrame".to_string()]
}

fn default_document_timeout() -> u32 {
    1000
}

fn default_source_encoding() -> String {
    "gbk".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Self {
        Self::load_from_path(Self::default_config_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("frame-capture")
            .join("config.toml")
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: PathBuf) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        std::fs::write(&path, contents)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
