//! Paper-trading submitter
//!
//! Stands in for the signing/broadcast collaborator when no wallet is wired.
//! Simulates confirmation latency, transient network failures and a realized
//! output somewhere between the quote and the route's worst case.

use async_trait::async_trait;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::time::Duration;
use tracing::info;
use crate::{
    errors::SubmissionError,
    execution::submitter::{SignerContext, TransactionReceipt, TransactionSubmitter},
    types::{ExecutionUrgency, Route},
};

#[derive(Debug, Clone)]
pub struct PaperSubmitter {
    pub base_latency_ms: u64,
    /// Probability in [0, 1] that an attempt fails with a network error.
    pub failure_rate: f64,
    pub network_fee: Decimal,
}

impl Default for PaperSubmitter {
    fn default() -> Self {
        Self {
            base_latency_ms: 400,
            failure_rate: 0.1,
            network_fee: dec!(0.000005),
        }
    }
}

impl PaperSubmitter {
    pub fn new(base_latency_ms: u64, failure_rate: f64) -> Self {
        Self {
            base_latency_ms,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    fn latency(&self, signer: &SignerContext) -> Duration {
        let factor = match (signer.use_priority_bundle, signer.urgency) {
            (true, _) | (_, ExecutionUrgency::High) => 0.5,
            (_, ExecutionUrgency::Normal) => 1.0,
            (_, ExecutionUrgency::Low) => 1.5,
        };
        Duration::from_millis((self.base_latency_ms as f64 * factor) as u64)
    }
}

/// Output between worst case and quote, `fill` in [0, 1] picking the point.
pub fn simulated_output(route: &Route, fill: Decimal) -> Decimal {
    let fill = fill.clamp(dec!(0), dec!(1));
    let worst = route.min_out_amount.min(route.out_amount);
    worst + (route.out_amount - worst) * fill
}

#[async_trait]
impl TransactionSubmitter for PaperSubmitter {
    async fn submit(&self, route: &Route, signer: &SignerContext) -> Result<TransactionReceipt, SubmissionError> {
        tokio::time::sleep(self.latency(signer)).await;

        if rand::random::<f64>() < self.failure_rate {
            return Err(SubmissionError::Network("simulated RPC failure".to_string()));
        }

        let fill = Decimal::from_f64(rand::random::<f64>()).unwrap_or(dec!(1));
        let out_amount = simulated_output(route, fill);
        let confirmation_id = format!("paper-{}", uuid::Uuid::new_v4().simple());

        info!(
            "🎭 Simulated fill {} via {:?} (bundle={}, fee hint={})",
            out_amount, route.hops, signer.use_priority_bundle, signer.priority_fee_micro_lamports
        );

        Ok(TransactionReceipt {
            confirmation_id,
            out_amount,
            fee: route.fee + self.network_fee,
        })
    }
}
