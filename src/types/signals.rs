//! Market signal snapshots consumed by strategy rules

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use super::SignalType;

/// Signal values sampled once per tick. Rules compare against this copy only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSignals {
    pub price: Option<Decimal>,
    pub volume: Option<Decimal>,
    /// Fractional price change since the previous sample.
    pub momentum: Option<Decimal>,
    pub signal: Option<Decimal>,
}

impl MarketSignals {
    pub fn value(&self, signal: SignalType) -> Option<Decimal> {
        match signal {
            SignalType::Price => self.price,
            SignalType::Volume => self.volume,
            SignalType::Momentum => self.momentum,
            SignalType::Signal => self.signal,
        }
    }
}

/// Balances used to resolve `TradeAmount::All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub token_balance: Decimal,
    pub quote_balance: Decimal,
}
