use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_BACKEND_URL;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Scheduling backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Terminal front end
    #[serde(default)]
    pub ui: UIConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base address both endpoints hang off
    pub base_url: String,
    /// Optional client deadline; unset means requests may wait indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UIConfig {
    /// Prefix messages with their time
    pub show_timestamps: bool,
    /// Colorize output
    pub color: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            show_timestamps: false,
            color: true,
        }
    }
}

/// Load configuration from the global file, the project-local file and
/// `MEDASSIST_` environment variables, in that order of precedence
pub fn load_config() -> Result<Config> {
    let mut paths = Vec::new();
    if let Ok(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }
    paths.push(PathBuf::from(".medassist/config.toml"));

    load_config_from(&paths)
}

/// Layer the given TOML files (later wins) over defaults, then environment
pub fn load_config_from(paths: &[PathBuf]) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for path in paths.iter().filter(|p| p.exists()) {
        figment = figment.merge(Toml::file(path));
    }

    // e.g. MEDASSIST_BACKEND__BASE_URL=http://clinic:8000
    figment = figment.merge(Env::prefixed("MEDASSIST_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "medassist") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("medassist");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist.
/// Returns the path of the global config file.
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");
    write_default_config(&config_file)?;
    Ok(config_file)
}

fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path.to_path_buf()))?;
    Ok(true)
}
