pub mod holdings;
pub mod metrics;
pub mod service;
pub mod snapshot;

pub use holdings::{default_holdings, parse_holdings, Holding, HoldingInput};
pub use service::{PortfolioService, PortfolioServiceTrait, PortfolioView, ResponseMetadata};
pub use snapshot::{PortfolioSnapshot, PortfolioSummary, SectorAggregate};
