//! Bounded trade history
//!
//! Fixed-size ring of executed trades plus an id index. Insertion order is
//! completion order; the oldest entry is evicted first once the ring is full.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use crate::types::TradeResult;

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 1000;

struct Ring {
    slots: Vec<Option<TradeResult>>,
    head: usize,
    len: usize,
    index: HashMap<String, usize>,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            index: HashMap::with_capacity(capacity),
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, result: TradeResult) -> Option<TradeResult> {
        let capacity = self.capacity();
        let mut evicted = None;

        if self.len == capacity {
            evicted = self.slots[self.head].take();
            if let Some(old) = &evicted {
                self.index.remove(&old.id);
            }
            self.head = (self.head + 1) % capacity;
            self.len -= 1;
        }

        let slot = (self.head + self.len) % capacity;
        self.index.insert(result.id.clone(), slot);
        self.slots[slot] = Some(result);
        self.len += 1;

        evicted
    }

    fn iter(&self) -> impl Iterator<Item = &TradeResult> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % capacity].as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub trades: usize,
    pub avg_slippage: Decimal,
    pub avg_price_impact: Decimal,
    pub total_fees: Decimal,
}

pub struct TradeHistory {
    ring: Mutex<Ring>,
}

impl TradeHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            ring: Mutex::new(Ring::new(max_size.max(1))),
        }
    }

    /// Appends a trade, evicting the oldest one first when full. Returns the
    /// evicted trade. A result whose id is already held is ignored.
    pub async fn record(&self, result: TradeResult) -> Option<TradeResult> {
        let mut ring = self.ring.lock().await;
        if ring.index.contains_key(&result.id) {
            warn!(trade_id = %result.id, "Trade already recorded, ignoring duplicate");
            return None;
        }

        let evicted = ring.push(result);
        if let Some(old) = &evicted {
            debug!(trade_id = %old.id, "Evicted oldest trade from history");
        }
        evicted
    }

    pub async fn get(&self, id: &str) -> Option<TradeResult> {
        let ring = self.ring.lock().await;
        ring.index
            .get(id)
            .and_then(|slot| ring.slots[*slot].clone())
    }

    /// Oldest to newest. Every call replays the current window.
    pub async fn list(&self) -> Vec<TradeResult> {
        self.ring.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.ring.lock().await.len
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn capacity(&self) -> usize {
        self.ring.lock().await.capacity()
    }

    pub async fn summary(&self) -> HistorySummary {
        let ring = self.ring.lock().await;
        if ring.len == 0 {
            return HistorySummary::default();
        }

        let (slippage, impact, fees) = ring.iter().fold(
            (dec!(0), dec!(0), dec!(0)),
            |(s, i, f), trade| (s + trade.slippage, i + trade.price_impact, f + trade.fee),
        );
        let count = Decimal::from(ring.len);

        HistorySummary {
            trades: ring.len,
            avg_slippage: slippage / count,
            avg_price_impact: impact / count,
            total_fees: fees,
        }
    }
}

impl Default for TradeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_SIZE)
    }
}
