//! Application-level store for holdings and the published view.

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;

pub use portfolio_model::*;
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::PortfolioServiceTrait;

#[cfg(test)]
mod portfolio_service_tests;
