use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REFRESH_INTERVAL_MS;
use crate::errors::{Error, Result};

/// Shortest auto-refresh interval accepted from a client.
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Client-local scheduler preferences.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerPreferences {
    pub auto_refresh: bool,
    pub refresh_interval_ms: u64,
    pub selected_sector: Option<String>,
}

impl Default for SchedulerPreferences {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            selected_sector: None,
        }
    }
}

impl SchedulerPreferences {
    /// The auto-refresh interval, never shorter than the accepted minimum.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(MIN_REFRESH_INTERVAL_MS))
    }

    /// Apply a partial update, validating the result.
    pub fn apply(&self, update: SchedulerPreferencesUpdate) -> Result<Self> {
        let mut next = self.clone();
        if let Some(auto_refresh) = update.auto_refresh {
            next.auto_refresh = auto_refresh;
        }
        if let Some(interval) = update.refresh_interval_ms {
            if interval < MIN_REFRESH_INTERVAL_MS {
                return Err(Error::invalid_input(format!(
                    "refreshIntervalMs must be at least {}",
                    MIN_REFRESH_INTERVAL_MS
                )));
            }
            next.refresh_interval_ms = interval;
        }
        if let Some(sector) = update.selected_sector {
            next.selected_sector = sector.filter(|s| !s.trim().is_empty());
        }
        Ok(next)
    }
}

/// Fields a client may change. `selectedSector: null` clears the filter.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerPreferencesUpdate {
    pub auto_refresh: Option<bool>,
    pub refresh_interval_ms: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub selected_sector: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from a missing field.
fn deserialize_some<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
