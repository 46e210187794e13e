//! Merges quote updates into holdings and recomputes derived fields.
//!
//! Pure functions only; the caller owns the holdings and decides when to
//! publish the result.

use std::collections::HashMap;

use log::warn;
use rust_decimal::Decimal;

use folioboard_market_data::QuoteResult;

use crate::constants::MAX_UNIT_PRICE;
use crate::portfolio::holdings::Holding;
use crate::utils::round_display;

/// Apply `updates` to `holdings` and recompute every derived field.
///
/// Holdings without a matching update (by symbol) keep their previous
/// price-derived values; weights are always recomputed. Updates priced above
/// [`MAX_UNIT_PRICE`] are ignored.
pub fn apply(holdings: &[Holding], updates: &[QuoteResult]) -> Vec<Holding> {
    let max_price = Decimal::from(MAX_UNIT_PRICE);
    let by_symbol: HashMap<&str, &QuoteResult> = updates
        .iter()
        .filter(|u| {
            let in_range = u.price <= max_price;
            if !in_range {
                warn!("Ignoring out-of-range price {} for {}", u.price, u.symbol);
            }
            in_range
        })
        .map(|u| (u.symbol.as_str(), u))
        .collect();

    let mut next: Vec<Holding> = holdings
        .iter()
        .map(|holding| match by_symbol.get(holding.symbol.as_str()) {
            Some(update) => merge_update(holding, update),
            None => holding.clone(),
        })
        .collect();

    assign_weights(&mut next);
    next
}

/// Recompute price-derived fields from the holding's own current price.
///
/// Used when holdings are supplied by the user: each holding is its own
/// update.
pub fn recompute(holdings: &[Holding]) -> Vec<Holding> {
    let mut next: Vec<Holding> = holdings
        .iter()
        .map(|h| {
            let mut h = h.clone();
            let price = h.current_price;
            revalue(&mut h, price);
            h
        })
        .collect();
    assign_weights(&mut next);
    next
}

fn merge_update(holding: &Holding, update: &QuoteResult) -> Holding {
    let mut next = holding.clone();
    revalue(&mut next, update.price);

    let fundamentals = &update.fundamentals;
    if fundamentals.pe_ratio.is_some() {
        next.pe_ratio = fundamentals.pe_ratio;
    }
    if fundamentals.latest_earnings.is_some() {
        next.latest_earnings = fundamentals.latest_earnings;
    }
    if fundamentals.market_cap.is_some() {
        next.market_cap = fundamentals.market_cap;
    }
    next.last_updated = Some(update.fetched_at);
    next
}

fn revalue(holding: &mut Holding, price: Decimal) {
    holding.current_price = round_display(price);
    holding.present_value = round_display(holding.current_price * holding.quantity);
    holding.gain_loss = round_display(holding.present_value - holding.investment);
    holding.gain_loss_percent = ratio(holding.gain_loss, holding.investment);
}

fn assign_weights(holdings: &mut [Holding]) {
    let total: Decimal = holdings.iter().map(|h| h.present_value).sum();
    for holding in holdings.iter_mut() {
        holding.portfolio_weight = ratio(holding.present_value, total);
    }
}

/// `numerator / denominator`, or zero when the denominator is not positive.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator
    } else {
        Decimal::ZERO
    }
}
