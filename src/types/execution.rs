//! Trade request and result types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

/// How hard a trade should push for inclusion. Maps to a slippage hint,
/// a deadline and a priority-fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionUrgency {
    Low,
    #[default]
    Normal,
    High,
}

/// A requested swap. Built once and never mutated after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeParams {
    pub input_token: String,
    pub output_token: String,
    pub amount: Decimal,
    pub order_type: OrderType,
    /// Minimum acceptable output per unit of input. Required for limit orders only.
    pub limit_price: Option<Decimal>,
    pub slippage_bps: Option<u32>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub urgency: ExecutionUrgency,
}

impl TradeParams {
    pub fn market(input_token: impl Into<String>, output_token: impl Into<String>, amount: Decimal) -> Self {
        Self {
            input_token: input_token.into(),
            output_token: output_token.into(),
            amount,
            order_type: OrderType::Market,
            limit_price: None,
            slippage_bps: None,
            deadline: None,
            urgency: ExecutionUrgency::Normal,
        }
    }

    pub fn limit(
        input_token: impl Into<String>,
        output_token: impl Into<String>,
        amount: Decimal,
        limit_price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            ..Self::market(input_token, output_token, amount)
        }
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = Some(slippage_bps);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_urgency(mut self, urgency: ExecutionUrgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// Normalized outcome of a confirmed swap. This is the only externally
/// observable shape of a completed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub id: String,
    pub input_token: String,
    pub output_token: String,
    pub input_amount: Decimal,
    pub output_amount: Decimal,
    pub execution_price: Decimal,
    /// (quoted - realized) / quoted. Negative when the fill beat the quote.
    pub slippage: Decimal,
    pub price_impact: Decimal,
    pub fee: Decimal,
    pub hops: Vec<String>,
    pub confirmation_id: String,
    pub attempts: u32,
    pub completed_at: DateTime<Utc>,
}
