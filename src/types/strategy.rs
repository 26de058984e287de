//! Strategy and rule definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use super::{ExecutionUrgency, TradeConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Price,
    Volume,
    Momentum,
    /// Advisory score, e.g. 1 for "exit position".
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "value")]
pub enum Comparison {
    GreaterThan(Decimal),
    LessThan(Decimal),
    Equals(Decimal),
    /// Closed interval `[lo, hi]`.
    Between(Decimal, Decimal),
}

impl Comparison {
    /// `Between` needs `lo <= hi`; an inverted range could never match.
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Comparison::Between(lo, hi) => lo <= hi,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub signal: SignalType,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAmount {
    Fixed(Decimal),
    /// Whole balance of the asset being spent.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub direction: TradeDirection,
    pub amount: TradeAmount,
    pub urgency: ExecutionUrgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRule {
    /// Lower fires first.
    pub priority: u32,
    pub condition: RuleCondition,
    pub action: RuleAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyStatus {
    Active,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StrategyDefinition")]
pub struct TradingStrategy {
    pub id: String,
    pub name: String,
    pub tokens: Vec<String>,
    /// Asset a buy spends and a sell receives.
    pub quote_token: String,
    rules: Vec<TradeRule>,
    pub config: TradeConfig,
    pub status: StrategyStatus,
}

/// Wire shape of a strategy. Deserialization goes through
/// `TradingStrategy::new` so rules come back in evaluation order.
#[derive(Deserialize)]
struct StrategyDefinition {
    id: String,
    name: String,
    tokens: Vec<String>,
    quote_token: String,
    rules: Vec<TradeRule>,
    config: TradeConfig,
    status: StrategyStatus,
}

impl From<StrategyDefinition> for TradingStrategy {
    fn from(def: StrategyDefinition) -> Self {
        let mut strategy = Self::new(def.id, def.name, def.tokens, def.quote_token, def.rules, def.config);
        strategy.status = def.status;
        strategy
    }
}

impl TradingStrategy {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tokens: Vec<String>,
        quote_token: impl Into<String>,
        rules: Vec<TradeRule>,
        config: TradeConfig,
    ) -> Self {
        let mut strategy = Self {
            id: id.into(),
            name: name.into(),
            tokens,
            quote_token: quote_token.into(),
            rules: Vec::new(),
            config,
            status: StrategyStatus::Active,
        };
        strategy.set_rules(rules);
        strategy
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[TradeRule] {
        &self.rules
    }

    // sort_by_key is stable, so equal priorities keep insertion order
    pub fn set_rules(&mut self, rules: Vec<TradeRule>) {
        self.rules = rules;
        self.rules.sort_by_key(|rule| rule.priority);
    }

    pub fn add_rule(&mut self, rule: TradeRule) {
        self.rules.push(rule);
        self.rules.sort_by_key(|rule| rule.priority);
    }

    pub fn applies_to(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn is_active(&self) -> bool {
        self.status == StrategyStatus::Active
    }
}
