use super::*;
use crate::portfolio::holdings::Holding;
use chrono::{TimeZone, Utc};
use folioboard_market_data::{Fundamentals, Provenance, QuoteResult, Tier};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn holding(id: &str, symbol: &str, purchase: Decimal, qty: Decimal) -> Holding {
    let mut h = Holding::new(symbol, symbol, "Technology", purchase, qty);
    h.id = id.to_string();
    h
}

fn update(symbol: &str, price: Decimal) -> QuoteResult {
    QuoteResult {
        symbol: symbol.to_string(),
        price,
        change: Decimal::ZERO,
        change_percent: Decimal::ZERO,
        fundamentals: Fundamentals::default(),
        provenance: Provenance::new(Tier::Primary, "YAHOO_CHART", None),
        fetched_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
    }
}

#[test]
fn test_single_holding_gain() {
    let holdings = vec![holding("1", "X", dec!(100), dec!(10))];
    let result = apply(&holdings, &[update("X", dec!(120))]);

    let h = &result[0];
    assert_eq!(h.current_price, dec!(120));
    assert_eq!(h.present_value, dec!(1200));
    assert_eq!(h.gain_loss, dec!(200));
    assert_eq!(h.gain_loss_percent, dec!(0.2));
    assert_eq!(h.portfolio_weight, dec!(1));
    assert!(h.last_updated.is_some());
}

#[test]
fn test_unmatched_holdings_keep_values() {
    let holdings = apply(
        &[
            holding("1", "A", dec!(100), dec!(10)),
            holding("2", "B", dec!(50), dec!(20)),
        ],
        &[update("A", dec!(110)), update("B", dec!(40))],
    );

    let result = apply(&holdings, &[update("A", dec!(150))]);

    assert_eq!(result[0].current_price, dec!(150));
    assert_eq!(result[1].current_price, dec!(40));
    assert_eq!(result[1].present_value, dec!(800));
    assert_eq!(result[1].gain_loss, dec!(-200));
    assert_eq!(result[1].last_updated, holdings[1].last_updated);

    // 1500 / 2300 and 800 / 2300
    let weight_sum = result[0].portfolio_weight + result[1].portfolio_weight;
    assert!((weight_sum - Decimal::ONE).abs() < dec!(0.000001));
}

#[test]
fn test_price_is_rounded_before_valuation() {
    let result = apply(
        &[holding("1", "A", dec!(10), dec!(3))],
        &[update("A", dec!(10.005))],
    );
    assert_eq!(result[0].current_price, dec!(10.01));
    assert_eq!(result[0].present_value, dec!(30.03));
    assert_eq!(result[0].gain_loss, dec!(0.03));
}

#[test]
fn test_zero_investment_has_zero_percent() {
    let result = apply(&[holding("1", "A", dec!(0), dec!(5))], &[update("A", dec!(20))]);
    assert_eq!(result[0].present_value, dec!(100));
    assert_eq!(result[0].gain_loss, dec!(100));
    assert_eq!(result[0].gain_loss_percent, Decimal::ZERO);
}

#[test]
fn test_zero_total_present_value_has_zero_weights() {
    let result = apply(
        &[
            holding("1", "A", dec!(10), dec!(0)),
            holding("2", "B", dec!(10), dec!(0)),
        ],
        &[],
    );
    let result = recompute(&result);
    assert!(result.iter().all(|h| h.portfolio_weight == Decimal::ZERO));
}

#[test]
fn test_absent_fundamentals_keep_prior_values() {
    let mut with_pe = update("A", dec!(100));
    with_pe.fundamentals.pe_ratio = Some(dec!(22.5));
    with_pe.fundamentals.latest_earnings = Some(dec!(4.1));

    let first = apply(&[holding("1", "A", dec!(90), dec!(1))], &[with_pe]);

    let mut only_cap = update("A", dec!(101));
    only_cap.fundamentals.market_cap = Some(dec!(1000000));
    let second = apply(&first, &[only_cap]);

    assert_eq!(second[0].pe_ratio, Some(dec!(22.5)));
    assert_eq!(second[0].latest_earnings, Some(dec!(4.1)));
    assert_eq!(second[0].market_cap, Some(dec!(1000000)));
}

#[test]
fn test_apply_is_idempotent() {
    let holdings = vec![
        holding("1", "A", dec!(100), dec!(3)),
        holding("2", "B", dec!(7.5), dec!(11)),
    ];
    let updates = [update("A", dec!(97.3)), update("B", dec!(8.125))];

    let once = apply(&holdings, &updates);
    let twice = apply(&once, &updates);
    assert_eq!(once, twice);
}

#[test]
fn test_recompute_uses_current_price() {
    let mut h = holding("1", "A", dec!(100), dec!(2));
    h.current_price = dec!(125);
    let result = recompute(&[h]);
    assert_eq!(result[0].present_value, dec!(250));
    assert_eq!(result[0].gain_loss, dec!(50));
    assert_eq!(result[0].gain_loss_percent, dec!(0.25));
    assert_eq!(result[0].last_updated, None);
}

#[test]
fn test_out_of_range_price_is_ignored() {
    let holdings = [holding("1", "A", dec!(10), Decimal::from(1_000_000_000_000u64))];
    let huge = Decimal::from(10i128.pow(20));
    let result = apply(&holdings, &[update("A", huge)]);
    assert_eq!(result[0].current_price, dec!(10));
    assert_eq!(result[0].present_value, holdings[0].present_value);
    assert!(result[0].last_updated.is_none());
}
