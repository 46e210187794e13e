use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folioboard_market_data::QuoteResult;

use crate::portfolio::holdings::Holding;
use crate::portfolio::metrics::{self, ratio};
use crate::utils::round_display;

/// Totals for one sector. Members are referenced by holding id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectorAggregate {
    pub sector: String,
    pub total_investment: Decimal,
    pub total_present_value: Decimal,
    pub gain_loss: Decimal,
    pub gain_loss_percent: Decimal,
    pub holding_ids: Vec<String>,
}

/// Totals across all holdings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_investment: Decimal,
    pub total_present_value: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_percent: Decimal,
    pub count: usize,
}

/// Holdings with their sector and portfolio totals, always rebuilt
/// together so the aggregates never drift from the members.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub holdings: Vec<Holding>,
    pub sectors: Vec<SectorAggregate>,
    pub summary: PortfolioSummary,
}

impl PortfolioSnapshot {
    /// Apply `updates` to `holdings`, then rebuild sectors and summary.
    pub fn compute(holdings: &[Holding], updates: &[QuoteResult]) -> Self {
        Self::from_holdings(metrics::apply(holdings, updates))
    }

    /// Build aggregates over holdings whose derived fields are already set.
    pub fn from_holdings(holdings: Vec<Holding>) -> Self {
        let sectors = build_sectors(&holdings);
        let summary = build_summary(&holdings);
        Self {
            holdings,
            sectors,
            summary,
        }
    }

    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    /// Holdings belonging to `sector`, in portfolio order.
    pub fn sector_holdings(&self, sector: &str) -> Vec<&Holding> {
        self.sectors
            .iter()
            .find(|s| s.sector == sector)
            .map(|s| {
                self.holdings
                    .iter()
                    .filter(|h| s.holding_ids.contains(&h.id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Sectors appear in the order of their first holding.
fn build_sectors(holdings: &[Holding]) -> Vec<SectorAggregate> {
    let mut sectors: Vec<SectorAggregate> = Vec::new();

    for holding in holdings {
        let index = match sectors.iter().position(|s| s.sector == holding.sector) {
            Some(index) => index,
            None => {
                sectors.push(SectorAggregate {
                    sector: holding.sector.clone(),
                    total_investment: Decimal::ZERO,
                    total_present_value: Decimal::ZERO,
                    gain_loss: Decimal::ZERO,
                    gain_loss_percent: Decimal::ZERO,
                    holding_ids: Vec::new(),
                });
                sectors.len() - 1
            }
        };
        let sector = &mut sectors[index];
        sector.total_investment += holding.investment;
        sector.total_present_value += holding.present_value;
        sector.holding_ids.push(holding.id.clone());
    }

    for sector in &mut sectors {
        sector.gain_loss = round_display(sector.total_present_value - sector.total_investment);
        sector.gain_loss_percent = ratio(sector.gain_loss, sector.total_investment);
    }
    sectors
}

fn build_summary(holdings: &[Holding]) -> PortfolioSummary {
    let total_investment: Decimal = holdings.iter().map(|h| h.investment).sum();
    let total_present_value: Decimal = holdings.iter().map(|h| h.present_value).sum();
    let total_gain_loss = round_display(total_present_value - total_investment);

    PortfolioSummary {
        total_investment,
        total_present_value,
        total_gain_loss,
        total_gain_loss_percent: ratio(total_gain_loss, total_investment),
        count: holdings.len(),
    }
}
