//! Pure price resolution.
//!
//! No I/O and no error paths: missing or invalid numeric input coerces to
//! zero rather than failing, matching how the rest of the storefront
//! treats price metadata.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::cart::CartLine;

/// Resolves the price a customer actually pays for one unit.
///
/// Without a discount the base price passes through unchanged. With one,
/// the discounted value is rounded half away from zero exactly once per
/// item; aggregate totals sum already-rounded per-item finals so rounding
/// drift never redistributes across lines. Never negative.
pub fn final_price(base_price: Decimal, discount_percent: Option<Decimal>) -> Decimal {
    let price = base_price.max(Decimal::ZERO);
    let discount = discount_percent
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

    if discount.is_zero() {
        return price;
    }

    (price - price * discount / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// The discounted unit price times quantity.
pub fn line_total(line: &CartLine) -> Decimal {
    final_price(line.base_price, line.discount_percent) * Decimal::from(line.quantity)
}

/// Sum of line totals; zero for an empty cart.
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(line_total).sum()
}

/// Reward coins earned on a paid (non cash-on-delivery) order:
/// `floor(amount * rate)`.
pub fn reward_coins(amount: Decimal, rate: Decimal) -> u64 {
    (amount.max(Decimal::ZERO) * rate)
        .floor()
        .to_u64()
        .unwrap_or(0)
}
