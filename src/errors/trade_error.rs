//! Typed failures of the trade executor

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use super::SubmissionError;

/// Why a candidate route failed the risk envelope. One tag per check.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("price impact {impact} exceeds max {max}")]
    PriceImpact { impact: Decimal, max: Decimal },

    #[error("route has non-positive amounts: in={in_amount} out={out_amount}")]
    InvalidAmounts { in_amount: Decimal, out_amount: Decimal },

    #[error("liquidity {liquidity} below min {min}")]
    InsufficientLiquidity { liquidity: Decimal, min: Decimal },

    #[error("slippage {slippage_bps}bps exceeds max {max_bps}bps")]
    Slippage { slippage_bps: Decimal, max_bps: u32 },

    #[error("quoted price {quoted} worse than limit {limit}")]
    LimitPrice { quoted: Decimal, limit: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStage {
    Quote,
    Submission,
    Backoff,
}

impl std::fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStage::Quote => write!(f, "quote"),
            ExecutionStage::Submission => write!(f, "submission"),
            ExecutionStage::Backoff => write!(f, "retry backoff"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Invalid trade params: {0}")]
    InvalidParams(String),

    #[error("No route for {input_token} -> {output_token}{}", fmt_detail(.detail))]
    NoRoute {
        input_token: String,
        output_token: String,
        detail: Option<String>,
    },

    #[error("Route rejected: {0}")]
    RouteRejected(RejectionReason),

    #[error("Execution failed after {attempts} attempt(s): {source}")]
    ExecutionFailed {
        attempts: u32,
        #[source]
        source: SubmissionError,
    },

    #[error("Deadline exceeded during {stage}")]
    DeadlineExceeded { stage: ExecutionStage },
}

/// Serializable projection of `TradeError` for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeErrorKind {
    InvalidParams,
    NoRoute,
    RouteRejected,
    ExecutionFailed,
    DeadlineExceeded,
}

impl TradeError {
    pub fn kind(&self) -> TradeErrorKind {
        match self {
            TradeError::InvalidParams(_) => TradeErrorKind::InvalidParams,
            TradeError::NoRoute { .. } => TradeErrorKind::NoRoute,
            TradeError::RouteRejected(_) => TradeErrorKind::RouteRejected,
            TradeError::ExecutionFailed { .. } => TradeErrorKind::ExecutionFailed,
            TradeError::DeadlineExceeded { .. } => TradeErrorKind::DeadlineExceeded,
        }
    }
}

fn fmt_detail(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default()
}

pub type TradeOutcome = Result<crate::types::TradeResult, TradeError>;
