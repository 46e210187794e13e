mod metrics_engine;

pub use metrics_engine::{apply, recompute};
pub(crate) use metrics_engine::ratio;

#[cfg(test)]
mod metrics_engine_tests;
