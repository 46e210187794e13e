//! Refresh scheduling and staleness policy.

mod refresh_model;
mod refresh_traits;
mod scheduler;

pub use refresh_model::*;
pub use refresh_traits::*;
pub use scheduler::{RefreshScheduler, SchedulerHandle};
