//! Risk envelope applied to every trade

use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Upper bounds and retry policy for a trade. Shared read-only; executions
/// take their own copy when they start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeConfig {
    pub max_slippage_bps: u32,
    /// Fraction, e.g. 0.01 for 1%.
    pub max_price_impact: Decimal,
    pub min_liquidity: Decimal,
    /// Total submission attempts for one accepted route (at least one is always made).
    pub retry_attempts: u32,
    pub use_priority_bundle: bool,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            max_slippage_bps: 100,
            max_price_impact: dec!(0.01),
            min_liquidity: dec!(1000),
            retry_attempts: 3,
            use_priority_bundle: false,
        }
    }
}

impl TradeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_price_impact < dec!(0) {
            return Err(anyhow::anyhow!("max_price_impact must be non-negative: {}", self.max_price_impact));
        }
        if self.max_price_impact > dec!(1) {
            return Err(anyhow::anyhow!("max_price_impact is a fraction, got {}", self.max_price_impact));
        }
        if self.min_liquidity < dec!(0) {
            return Err(anyhow::anyhow!("min_liquidity must be non-negative: {}", self.min_liquidity));
        }
        if self.max_slippage_bps > 10_000 {
            return Err(anyhow::anyhow!("max_slippage_bps above 100%: {}", self.max_slippage_bps));
        }
        Ok(())
    }

    pub fn submission_attempts(&self) -> u32 {
        self.retry_attempts.max(1)
    }
}
