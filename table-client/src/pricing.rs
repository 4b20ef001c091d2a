//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic happens in `Decimal`; values convert to `f64` only at
//! the display/serialization boundary. Prices are VAT-inclusive.

use rust_decimal::prelude::*;
use shared::models::{ItemModifier, ModifierAction, TableOrder};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// VAT rate applied to all menu prices (18%)
pub const VAT_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Divisor extracting the net amount from a VAT-inclusive total (1.18)
pub const VAT_MULTIPLIER: Decimal = Decimal::from_parts(118, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for display, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Sum of modifier price deltas.
///
/// Deltas are applied regardless of `action`: a removal carrying a negative
/// delta reduces the price, a removal with a zero delta is label-only.
pub fn modifiers_delta(modifiers: &[ItemModifier]) -> Decimal {
    modifiers.iter().map(|m| to_decimal(m.price_delta)).sum()
}

/// Effective per-unit price: base price plus all modifier deltas
pub fn unit_price(base_price: f64, modifiers: &[ItemModifier]) -> Decimal {
    to_decimal(base_price) + modifiers_delta(modifiers)
}

/// Line total: unit price times quantity
pub fn line_total(base_price: f64, modifiers: &[ItemModifier], quantity: i32) -> Decimal {
    unit_price(base_price, modifiers) * Decimal::from(quantity)
}

/// Display label for a modifier ("No X" for removals)
pub fn modifier_label(modifier: &ItemModifier) -> String {
    match modifier.action {
        ModifierAction::Remove => format!("No {}", modifier.name),
        ModifierAction::Add => modifier.name.clone(),
    }
}

/// Sum of authoritative order totals
pub fn sum_order_totals<'a>(orders: impl IntoIterator<Item = &'a TableOrder>) -> Decimal {
    orders
        .into_iter()
        .map(|o| to_decimal(o.total_amount))
        .sum()
}

/// Net/VAT decomposition of a VAT-inclusive total
///
/// `subtotal + vat` reconstructs the input total exactly; rounding is
/// deferred to display via [`to_f64`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VatBreakdown {
    pub subtotal: Decimal,
    pub vat: Decimal,
}

impl VatBreakdown {
    pub fn from_inclusive_total(total: Decimal) -> Self {
        let subtotal = total / VAT_MULTIPLIER;
        Self {
            subtotal,
            vat: total - subtotal,
        }
    }

    pub fn from_inclusive_f64(total: f64) -> Self {
        Self::from_inclusive_total(to_decimal(total))
    }
}
