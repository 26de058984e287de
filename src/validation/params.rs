//! Trade parameter validation, run before any network call

use rust_decimal_macros::dec;
use crate::errors::TradeError;
use crate::types::{OrderType, TradeParams};

pub fn validate_params(params: &TradeParams) -> Result<(), TradeError> {
    if params.input_token.trim().is_empty() || params.output_token.trim().is_empty() {
        return Err(TradeError::InvalidParams("input and output tokens are required".to_string()));
    }

    if params.input_token == params.output_token {
        return Err(TradeError::InvalidParams(format!(
            "input and output token are the same: {}",
            params.input_token
        )));
    }

    if params.amount <= dec!(0) {
        return Err(TradeError::InvalidParams(format!("amount must be positive: {}", params.amount)));
    }

    match (params.order_type, params.limit_price) {
        (OrderType::Limit, None) => {
            return Err(TradeError::InvalidParams("limit order requires a limit price".to_string()));
        }
        (OrderType::Limit, Some(price)) if price <= dec!(0) => {
            return Err(TradeError::InvalidParams(format!("limit price must be positive: {}", price)));
        }
        (OrderType::Market, Some(_)) => {
            return Err(TradeError::InvalidParams("limit price is only valid for limit orders".to_string()));
        }
        _ => {}
    }

    if params.slippage_bps.is_some_and(|bps| bps > 10_000) {
        return Err(TradeError::InvalidParams(format!(
            "slippage tolerance above 100%: {:?}bps",
            params.slippage_bps
        )));
    }

    Ok(())
}
