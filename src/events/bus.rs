//! Broadcast channel for trade notifications
//!
//! Publishing never blocks. Delivery is at-most-once: events published with no
//! subscribers are dropped, and a subscriber that falls more than `capacity`
//! events behind skips the overflow.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::trace;
use crate::errors::TradeError;
use crate::types::{TradeEvent, TradeParams, TradeResult};

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TradeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: TradeEvent) {
        // Err only means nobody is listening
        if self.sender.send(event).is_err() {
            trace!("Trade event dropped, no subscribers");
        }
    }

    pub fn trade_executed(&self, result: &TradeResult) {
        self.publish(TradeEvent::TradeExecuted(result.clone()));
    }

    pub fn trade_failed(&self, params: &TradeParams, error: &TradeError) {
        self.publish(TradeEvent::TradeFailed {
            input_token: params.input_token.clone(),
            output_token: params.output_token.clone(),
            kind: error.kind(),
            reason: error.to_string(),
            at: Utc::now(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TradeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
