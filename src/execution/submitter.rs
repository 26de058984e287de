//! Submission boundary: sign, broadcast and confirm an accepted route

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use crate::errors::SubmissionError;
use crate::types::{ExecutionUrgency, Route};

/// Signing hints forwarded to the submitter. Keys never pass through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignerContext {
    pub use_priority_bundle: bool,
    pub urgency: ExecutionUrgency,
    /// Compute-unit price hint; the submitter decides how to apply it.
    pub priority_fee_micro_lamports: u64,
}

impl SignerContext {
    pub fn new(use_priority_bundle: bool, urgency: ExecutionUrgency) -> Self {
        Self {
            use_priority_bundle,
            urgency,
            priority_fee_micro_lamports: priority_fee_for(urgency),
        }
    }
}

pub fn priority_fee_for(urgency: ExecutionUrgency) -> u64 {
    match urgency {
        ExecutionUrgency::Low => 0,
        ExecutionUrgency::Normal => 10_000,
        ExecutionUrgency::High => 100_000,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionReceipt {
    /// Transaction signature or bundle id.
    pub confirmation_id: String,
    pub out_amount: Decimal,
    pub fee: Decimal,
}

#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, route: &Route, signer: &SignerContext) -> Result<TransactionReceipt, SubmissionError>;
}
