//! Aggregator route types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A candidate fill returned by a route provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub in_amount: Decimal,
    /// Quoted output.
    pub out_amount: Decimal,
    /// Worst-case output after the requested slippage tolerance.
    pub min_out_amount: Decimal,
    /// Venue labels, in swap order.
    pub hops: Vec<String>,
    /// Fraction, e.g. 0.005 for 0.5%.
    pub price_impact: Decimal,
    /// Depth the route draws on, in input-amount units.
    pub liquidity: Decimal,
    pub fee: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Route {
    /// Output per unit of input as quoted.
    pub fn quoted_price(&self) -> Option<Decimal> {
        if self.in_amount <= dec!(0) {
            return None;
        }
        Some(self.out_amount / self.in_amount)
    }

    /// Spread between quoted and worst-case output, in basis points.
    pub fn slippage_bps(&self) -> Option<Decimal> {
        if self.out_amount <= dec!(0) {
            return None;
        }
        Some((self.out_amount - self.min_out_amount) / self.out_amount * dec!(10000))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}
