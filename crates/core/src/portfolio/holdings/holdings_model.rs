use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_SECTOR, MAX_HOLDINGS, MAX_QUANTITY, MAX_UNIT_PRICE};
use crate::errors::{Error, Result, ValidationError};
use crate::utils::round_display;

/// A single portfolio position with its derived valuation fields.
///
/// `investment` is fixed when the holding is created. Every other derived
/// field (`present_value`, `gain_loss`, `gain_loss_percent`,
/// `portfolio_weight`) is written only by the metrics engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    /// Display name
    pub particulars: String,
    /// Exchange code (e.g. "HDFCBANK")
    pub symbol: String,
    pub purchase_price: Decimal,
    pub quantity: Decimal,
    pub investment: Decimal,

    pub current_price: Decimal,
    pub present_value: Decimal,
    pub gain_loss: Decimal,
    /// Fraction of investment (0.2 = +20%)
    pub gain_loss_percent: Decimal,
    /// Fraction of total present value
    pub portfolio_weight: Decimal,

    pub sector: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_earnings: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,

    /// Fetch time of the quote last merged into this holding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A holding as submitted by a user. Derived fields are ignored and
/// recomputed.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct HoldingInput {
    pub id: Option<serde_json::Value>,
    pub particulars: Option<String>,
    #[serde(alias = "nseCode")]
    pub symbol: Option<String>,
    pub purchase_price: Option<Decimal>,
    #[serde(alias = "qty")]
    pub quantity: Option<Decimal>,
    pub investment: Option<Decimal>,
    #[serde(alias = "cmp")]
    pub current_price: Option<Decimal>,
    pub sector: Option<String>,
    pub pe_ratio: Option<Decimal>,
    pub latest_earnings: Option<Decimal>,
    pub market_cap: Option<Decimal>,
}

impl Holding {
    /// Create a holding priced at its purchase price.
    pub fn new(
        particulars: impl Into<String>,
        symbol: impl Into<String>,
        sector: impl Into<String>,
        purchase_price: Decimal,
        quantity: Decimal,
    ) -> Self {
        let investment = round_display(purchase_price * quantity);
        Self {
            id: Uuid::new_v4().to_string(),
            particulars: particulars.into(),
            symbol: symbol.into(),
            purchase_price,
            quantity,
            investment,
            current_price: purchase_price,
            present_value: investment,
            gain_loss: Decimal::ZERO,
            gain_loss_percent: Decimal::ZERO,
            portfolio_weight: Decimal::ZERO,
            sector: sector.into(),
            pe_ratio: None,
            latest_earnings: None,
            market_cap: None,
            last_updated: None,
        }
    }
}

impl HoldingInput {
    /// Validate and turn into a holding.
    ///
    /// - `symbol`, `purchasePrice` and `quantity` are required
    /// - prices and quantity must not be negative, prices must not exceed
    ///   [`MAX_UNIT_PRICE`] and quantity must not exceed [`MAX_QUANTITY`]
    /// - `investment` defaults to `round(purchasePrice x quantity, 2)`
    /// - `currentPrice` defaults to the purchase price
    /// - ids may be strings or numbers; a missing id gets a fresh UUID
    pub fn into_holding(self, index: usize) -> Result<Holding> {
        let field = |name: &str| -> Error {
            ValidationError::MissingField(format!("holdings[{}].{}", index, name)).into()
        };

        let symbol = self
            .symbol
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| field("symbol"))?;
        let purchase_price = self.purchase_price.ok_or_else(|| field("purchasePrice"))?;
        let quantity = self.quantity.ok_or_else(|| field("quantity"))?;

        if purchase_price.is_sign_negative() || quantity.is_sign_negative() {
            return Err(Error::invalid_input(format!(
                "holdings[{}]: purchasePrice and quantity must not be negative",
                index
            )));
        }
        if let Some(price) = self.current_price {
            if price.is_sign_negative() {
                return Err(Error::invalid_input(format!(
                    "holdings[{}]: currentPrice must not be negative",
                    index
                )));
            }
        }
        let max_price = Decimal::from(MAX_UNIT_PRICE);
        if purchase_price > max_price || self.current_price.is_some_and(|p| p > max_price) {
            return Err(Error::invalid_input(format!(
                "holdings[{}]: prices must not exceed {}",
                index, MAX_UNIT_PRICE
            )));
        }
        if quantity > Decimal::from(MAX_QUANTITY) {
            return Err(Error::invalid_input(format!(
                "holdings[{}]: quantity must not exceed {}",
                index, MAX_QUANTITY
            )));
        }
        let cost = purchase_price.checked_mul(quantity).ok_or_else(|| {
            Error::invalid_input(format!("holdings[{}]: investment is out of range", index))
        })?;
        if let Some(investment) = self.investment {
            if investment.abs() > max_price * Decimal::from(MAX_QUANTITY) {
                return Err(Error::invalid_input(format!(
                    "holdings[{}]: investment is out of range",
                    index
                )));
            }
        }

        let id = match self.id {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let investment = self
            .investment
            .map(round_display)
            .unwrap_or_else(|| round_display(cost));

        let current_price = round_display(self.current_price.unwrap_or(purchase_price));

        Ok(Holding {
            id,
            particulars: self
                .particulars
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| symbol.clone()),
            symbol,
            purchase_price,
            quantity,
            investment,
            current_price,
            present_value: Decimal::ZERO,
            gain_loss: Decimal::ZERO,
            gain_loss_percent: Decimal::ZERO,
            portfolio_weight: Decimal::ZERO,
            sector: self
                .sector
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SECTOR.to_string()),
            pe_ratio: self.pe_ratio,
            latest_earnings: self.latest_earnings,
            market_cap: self.market_cap,
            last_updated: None,
        })
    }
}

/// Parse a JSON body that must be an array of holdings.
pub fn parse_holdings(body: &serde_json::Value) -> Result<Vec<Holding>> {
    let items = body
        .as_array()
        .ok_or_else(|| Error::invalid_input("Invalid holdings data: body must be a JSON array"))?;
    if items.len() > MAX_HOLDINGS {
        return Err(Error::invalid_input(format!(
            "Invalid holdings data: at most {} holdings are accepted",
            MAX_HOLDINGS
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let input: HoldingInput = serde_json::from_value(item.clone()).map_err(|e| {
                Error::invalid_input(format!("holdings[{}]: {}", index, e))
            })?;
            input.into_holding(index)
        })
        .collect()
}
