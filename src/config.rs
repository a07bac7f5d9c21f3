use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::CollectionSort;
use crate::tracker::UPCOMING_DEADLINE_LIMIT;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_reader_name")]
    pub reader_name: String,

    #[serde(default)]
    pub default_sort: CollectionSort,

    /// Only allow one automatic daily advance per book per day.
    #[serde(default)]
    pub advance_once_per_day: bool,

    #[serde(default = "default_deadline_limit")]
    pub upcoming_deadline_limit: usize,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bookpace");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("library.db").to_string_lossy().to_string()
}

fn default_reader_name() -> String {
    "reader".to_string()
}

fn default_deadline_limit() -> usize {
    UPCOMING_DEADLINE_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            reader_name: default_reader_name(),
            default_sort: CollectionSort::default(),
            advance_once_per_day: false,
            upcoming_deadline_limit: default_deadline_limit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if config.reader_name.trim().is_empty() {
            return Err(anyhow::anyhow!("reader_name in {} cannot be empty", path.display()).into());
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bookpace")
            .join("config.toml")
    }
}
