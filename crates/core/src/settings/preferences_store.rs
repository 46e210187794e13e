use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, warn};

use super::preferences_model::{SchedulerPreferences, SchedulerPreferencesUpdate};
use crate::errors::{Error, Result};

/// JSON file store for [`SchedulerPreferences`].
pub struct PreferencesStore {
    path: PathBuf,
    current: RwLock<SchedulerPreferences>,
}

impl PreferencesStore {
    /// Open the store, loading the file if it exists.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = Self::load_from(&path);
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> SchedulerPreferences {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply an update, persist it and return the new preferences.
    pub fn update(&self, update: SchedulerPreferencesUpdate) -> Result<SchedulerPreferences> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let next = current.apply(update)?;
        self.save(&next)?;
        *current = next.clone();
        Ok(next)
    }

    /// Missing or unreadable files yield defaults.
    fn load_from(path: &Path) -> SchedulerPreferences {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No preferences at {}: {}", path.display(), e);
                return SchedulerPreferences::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring unreadable preferences at {}: {}", path.display(), e);
            SchedulerPreferences::default()
        })
    }

    /// Write to a sibling temp file, then rename over the target.
    fn save(&self, preferences: &SchedulerPreferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(preferences)
            .map_err(|e| Error::Preferences(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}
