//! Advisory collaborator boundary

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// External sentiment/AI service. Its score feeds `SignalType::Signal`;
/// by convention 1 means "exit position" and 0 means "hold".
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn signal(&self, token: &str) -> Result<Decimal>;
}
