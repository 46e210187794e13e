//! Holdings: the positions the dashboard values.

mod holdings_constants;
mod holdings_model;

pub use holdings_constants::default_holdings;
pub use holdings_model::*;
