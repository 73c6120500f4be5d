use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHART_URL: &str = "http://localhost:8000/chart";
pub const DEFAULT_CHART_FILE_NAME: &str = "stock_chart.png";

pub const BASE_URL_ENV: &str = "FINASSIST_BASE_URL";
pub const CHART_URL_ENV: &str = "FINASSIST_CHART_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub chart_url: String,
    pub chart_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chart_url: DEFAULT_CHART_URL.to_string(),
            chart_file_name: DEFAULT_CHART_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Environment variables take precedence over the file
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(CHART_URL_ENV).ok(),
        );
    }

    pub fn apply_overrides(&mut self, base_url: Option<String>, chart_url: Option<String>) {
        if let Some(base_url) = base_url.filter(|s| !s.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(chart_url) = chart_url.filter(|s| !s.is_empty()) {
            self.chart_url = chart_url;
        }
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("finassist"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.json"))
    }
}
