use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FULL_STALENESS, DEFAULT_PARTIAL_STALENESS, DEFAULT_SYNTHETIC_STALENESS,
};
use crate::quotes::SourceClassification;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Refreshing,
}

/// Bookkeeping of refresh attempts. Written only when an attempt starts or
/// completes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshState {
    pub last_success: Option<DateTime<Utc>>,
    pub last_provenance: Option<SourceClassification>,
    pub last_error: Option<String>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub in_flight: bool,
}

impl RefreshState {
    pub fn scheduler_state(&self) -> SchedulerState {
        if self.in_flight {
            SchedulerState::Refreshing
        } else {
            SchedulerState::Idle
        }
    }
}

/// How long a refresh stays fresh, by the quality of its data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StalenessPolicy {
    /// Full and user-provided data
    pub full: Duration,
    pub partial: Duration,
    pub synthetic: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            full: DEFAULT_FULL_STALENESS,
            partial: DEFAULT_PARTIAL_STALENESS,
            synthetic: DEFAULT_SYNTHETIC_STALENESS,
        }
    }
}

impl StalenessPolicy {
    pub fn threshold(&self, classification: SourceClassification) -> Duration {
        match classification {
            SourceClassification::Full | SourceClassification::UserProvided => self.full,
            SourceClassification::Partial => self.partial,
            SourceClassification::SyntheticOnly => self.synthetic,
        }
    }

    /// A state without a successful refresh is always stale.
    pub fn is_stale(&self, state: &RefreshState, now: DateTime<Utc>) -> bool {
        let (Some(last_success), Some(provenance)) = (state.last_success, state.last_provenance)
        else {
            return true;
        };
        match (now - last_success).to_std() {
            Ok(age) => age >= self.threshold(provenance),
            Err(_) => false,
        }
    }
}

/// What a trigger did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    Completed(SourceClassification),
    /// Another refresh was already running.
    SkippedInFlight,
    NotStale,
    AutoRefreshDisabled,
    Failed(String),
}
