//! Key-value persistence for dashboard settings, injected wherever the
//! dashboard needs to remember something between sessions.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{DashboardError, Result};
use crate::format::ValueUnit;
use crate::types::{FilterSelection, ReportType};

pub trait ConfigStore {
    fn load(&self, key: &str) -> Result<Option<Value>>;
    fn save(&mut self, key: &str, value: Value) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Typed load. A stored document that no longer fits `T` is treated as
    /// absent.
    fn load_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        let Some(value) = self.load(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring stored value with unexpected shape");
                Ok(None)
            }
        }
    }

    fn save_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.save(key, serde_json::to_value(value)?)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One pretty-printed `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DashboardError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&text) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupted settings file");
                Ok(None)
            }
        }
    }

    fn save(&mut self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub const SETTINGS_KEY: &str = "dashboard-settings";

/// The persisted dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSettings {
    pub department: String,
    pub report_type: ReportType,
    pub value_unit: ValueUnit,
    #[serde(default)]
    pub selection: FilterSelection,
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            department: "Sales".to_string(),
            report_type: ReportType::Products,
            value_unit: ValueUnit::Lakhs,
            selection: FilterSelection::default(),
            saved_at: None,
        }
    }
}

impl DashboardSettings {
    pub fn load<S: ConfigStore>(store: &S) -> Result<Option<Self>> {
        store.load_as(SETTINGS_KEY)
    }

    /// Stamp and persist.
    pub fn save<S: ConfigStore>(&mut self, store: &mut S) -> Result<()> {
        self.saved_at = Some(Utc::now());
        store.save_as(SETTINGS_KEY, &*self)
    }
}
