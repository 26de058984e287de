//! Notifications published by the trade executor

use chrono::{DateTime, Utc};
use serde::Serialize;
use super::TradeResult;
use crate::errors::TradeErrorKind;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TradeEvent {
    TradeExecuted(TradeResult),
    TradeFailed {
        input_token: String,
        output_token: String,
        kind: TradeErrorKind,
        reason: String,
        at: DateTime<Utc>,
    },
}
