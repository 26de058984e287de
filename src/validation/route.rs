//! Route constraint checks
//!
//! Pure functions over a route and a risk envelope. The first failed check is
//! reported; checks always run in the same order so a given route and config
//! always produce the same verdict.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::errors::RejectionReason;
use crate::types::{Route, TradeConfig};

pub fn validate_route(route: &Route, config: &TradeConfig) -> Result<(), RejectionReason> {
    if route.price_impact > config.max_price_impact {
        return Err(RejectionReason::PriceImpact {
            impact: route.price_impact,
            max: config.max_price_impact,
        });
    }

    if route.in_amount <= dec!(0) || route.out_amount <= dec!(0) {
        return Err(RejectionReason::InvalidAmounts {
            in_amount: route.in_amount,
            out_amount: route.out_amount,
        });
    }

    if route.liquidity < config.min_liquidity {
        return Err(RejectionReason::InsufficientLiquidity {
            liquidity: route.liquidity,
            min: config.min_liquidity,
        });
    }

    // out_amount > 0 is established above
    let slippage_bps = route.slippage_bps().unwrap_or_default();
    if slippage_bps > Decimal::from(config.max_slippage_bps) {
        return Err(RejectionReason::Slippage {
            slippage_bps,
            max_bps: config.max_slippage_bps,
        });
    }

    Ok(())
}

/// Limit orders only accept routes quoting at least `limit` output per unit of input.
pub fn check_limit_price(route: &Route, limit: Decimal) -> Result<(), RejectionReason> {
    let quoted = route.quoted_price().unwrap_or_default();
    if quoted < limit {
        return Err(RejectionReason::LimitPrice { quoted, limit });
    }
    Ok(())
}
