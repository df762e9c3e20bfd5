use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

pub const CONFIG_FILE: &str = "dashboard.toml";

/// Runtime settings for the console dashboard. Every field has a default so
/// an absent or partial `dashboard.toml` is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub settings_dir: PathBuf,
    pub value_unit: String,
    pub department: String,
    pub preview_rows: usize,
    pub slide_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("demos/brokerage_records.csv"),
            output_dir: PathBuf::from("."),
            settings_dir: PathBuf::from(".dashboard"),
            value_unit: "L".to_string(),
            department: "Sales".to_string(),
            preview_rows: 5,
            slide_seconds: 3,
        }
    }
}

impl AppConfig {
    /// Read `path` when it exists, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            toml::from_str(&text)?
        } else {
            AppConfig::default()
        };
        config.apply_overrides(|k| std::env::var(k).ok());
        Ok(config)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("DASHBOARD_DATA") {
            self.data_path = PathBuf::from(v);
        }
        if let Some(v) = var("DASHBOARD_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = var("DASHBOARD_UNIT") {
            self.value_unit = v;
        }
    }

    pub fn slide_interval(&self) -> Duration {
        Duration::from_secs(self.slide_seconds.max(1))
    }
}
