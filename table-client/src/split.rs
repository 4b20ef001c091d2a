//! Payment split selection and tip math
//!
//! A diner settles the bill against one of three bases: only their own
//! unpaid orders, the whole table, or an equal share of the table split
//! `n` ways. Tip percentage always applies to the currently selected base,
//! so switching modes resets it rather than silently re-scaling.

use rust_decimal::prelude::*;

use crate::error::{ClientError, ClientResult};
use crate::pricing::to_decimal;

/// Selectable tip percentages
pub const TIP_PERCENT_OPTIONS: [u32; 6] = [0, 5, 10, 12, 15, 20];

/// Payment base selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Pay the caller's own unpaid orders
    MyOrders,
    /// Pay the whole table
    FullTable,
    /// Pay an equal share of the table, split `n` ways
    SplitEqual(u32),
}

/// Computed payment amounts for a selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitQuote {
    pub base: Decimal,
    pub tip: Decimal,
    pub total: Decimal,
}

/// Current mode and tip choice
#[derive(Debug, Clone)]
pub struct SplitSelection {
    mode: SplitMode,
    tip_percent: u32,
}

impl Default for SplitSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitSelection {
    pub fn new() -> Self {
        Self {
            mode: SplitMode::MyOrders,
            tip_percent: 0,
        }
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    pub fn tip_percent(&self) -> u32 {
        self.tip_percent
    }

    /// Select a payment base. The tip was chosen against the previous
    /// base, so it resets to zero here.
    pub fn select_mode(&mut self, mode: SplitMode) {
        self.mode = mode;
        self.tip_percent = 0;
    }

    pub fn set_tip_percent(&mut self, percent: u32) {
        self.tip_percent = percent;
    }

    /// Quote the current selection against the table's totals
    pub fn quote(&self, table_total: f64, my_unpaid_total: f64) -> ClientResult<SplitQuote> {
        quote(self.mode, self.tip_percent, table_total, my_unpaid_total)
    }
}

/// Compute base, tip and total for a mode and tip percentage.
///
/// Tip is rounded to whole cents, half away from zero.
pub fn quote(
    mode: SplitMode,
    tip_percent: u32,
    table_total: f64,
    my_unpaid_total: f64,
) -> ClientResult<SplitQuote> {
    let base = match mode {
        SplitMode::MyOrders => to_decimal(my_unpaid_total),
        SplitMode::FullTable => to_decimal(table_total),
        SplitMode::SplitEqual(parts) => {
            if parts < 2 {
                return Err(ClientError::Validation(format!(
                    "equal split requires at least 2 parts, got {parts}"
                )));
            }
            to_decimal(table_total) / Decimal::from(parts)
        }
    };

    let tip = (base * Decimal::from(tip_percent))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        / Decimal::ONE_HUNDRED;

    Ok(SplitQuote {
        base,
        tip,
        total: base + tip,
    })
}
