use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Folder scanned for images when none is given on the command line.
    pub image_root: Option<String>,
    /// Directory name searched for under the working directory as a
    /// fallback when no image root is configured.
    #[serde(default = "default_data_dir_name")]
    pub data_dir_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Folder that receives the dataset archives by default.
    pub output_root: Option<String>,
    #[serde(default)]
    pub recent_exports: Vec<String>,
}

// Default value functions
fn default_data_dir_name() -> String {
    "image_data".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            image_root: None,
            data_dir_name: default_data_dir_name(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_root: None,
            recent_exports: Vec::new(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Get the path to the config file
pub fn config_path() -> PathBuf {
    let config_dir = directories::ProjectDirs::from("", "", "boxlabel")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("config.toml")
}

/// Load configuration from file, or return default if file doesn't exist
pub fn load_config() -> AppConfig {
    let path = config_path();
    if path.exists() {
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to parse config file: {}. Using defaults.", e);
                    AppConfig::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file: {}. Using defaults.", e);
                AppConfig::default()
            }
        }
    } else {
        AppConfig::default()
    }
}

/// Save configuration to file
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let path = config_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let toml = toml::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(&path, toml).map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

/// Add an output folder to the recent exports list
pub fn add_recent_export(config: &mut AppConfig, path: String) {
    // Remove if already in list
    config.export.recent_exports.retain(|p| p != &path);

    // Add to front
    config.export.recent_exports.insert(0, path);

    // Keep only last 10
    config.export.recent_exports.truncate(10);
}
