use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Round half away from zero to `dp` places.
pub fn round_to_precision(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary value to display precision.
pub fn round_display(value: Decimal) -> Decimal {
    round_to_precision(value, DISPLAY_DECIMAL_PRECISION)
}
