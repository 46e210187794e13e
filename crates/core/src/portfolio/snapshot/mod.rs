//! Sector aggregates and portfolio summary.

mod snapshot_model;

pub use snapshot_model::*;
