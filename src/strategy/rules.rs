//! Rule matching and action resolution

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use crate::types::{
    Comparison, ExecutionUrgency, Holdings, MarketSignals, RuleAction, RuleCondition, TradeAmount,
    TradeDirection, TradeParams, TradeRule, TradingStrategy,
};

pub fn comparison_holds(comparison: &Comparison, value: Decimal) -> bool {
    match *comparison {
        Comparison::GreaterThan(threshold) => value > threshold,
        Comparison::LessThan(threshold) => value < threshold,
        Comparison::Equals(threshold) => value == threshold,
        Comparison::Between(lo, hi) => lo <= value && value <= hi,
    }
}

/// A missing signal value never satisfies a condition.
pub fn condition_holds(condition: &RuleCondition, signals: &MarketSignals) -> bool {
    signals
        .value(condition.signal)
        .is_some_and(|value| comparison_holds(&condition.comparison, value))
}

/// First rule, in evaluation order, whose condition holds.
pub fn first_match<'a>(rules: &'a [TradeRule], signals: &MarketSignals) -> Option<&'a TradeRule> {
    rules.iter().find(|rule| condition_holds(&rule.condition, signals))
}

pub fn urgency_slippage_bps(urgency: ExecutionUrgency, max_slippage_bps: u32) -> u32 {
    match urgency {
        ExecutionUrgency::Low => max_slippage_bps / 2,
        ExecutionUrgency::Normal | ExecutionUrgency::High => max_slippage_bps,
    }
}

pub fn urgency_deadline(urgency: ExecutionUrgency) -> chrono::Duration {
    match urgency {
        ExecutionUrgency::Low => chrono::Duration::seconds(60),
        ExecutionUrgency::Normal => chrono::Duration::seconds(30),
        ExecutionUrgency::High => chrono::Duration::seconds(15),
    }
}

/// Builds the market order a fired rule asks for. `None` when the resolved
/// amount is not positive, e.g. selling `All` of an empty position.
pub fn build_trade_params(
    strategy: &TradingStrategy,
    token: &str,
    action: &RuleAction,
    holdings: &Holdings,
) -> Option<TradeParams> {
    let (input_token, output_token, balance) = match action.direction {
        TradeDirection::Buy => (strategy.quote_token.as_str(), token, holdings.quote_balance),
        TradeDirection::Sell => (token, strategy.quote_token.as_str(), holdings.token_balance),
    };

    let amount = match action.amount {
        TradeAmount::Fixed(amount) => amount,
        TradeAmount::All => balance,
    };
    if amount <= dec!(0) {
        return None;
    }

    Some(
        TradeParams::market(input_token, output_token, amount)
            .with_slippage_bps(urgency_slippage_bps(action.urgency, strategy.config.max_slippage_bps))
            .with_deadline(Utc::now() + urgency_deadline(action.urgency))
            .with_urgency(action.urgency),
    )
}
