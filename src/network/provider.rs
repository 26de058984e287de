//! Route provider boundary

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::types::Route;

/// Source of candidate routes, typically a DEX aggregator.
///
/// Candidates come back best-first as ranked by the provider. An empty vector
/// means no route exists; `Err` is reserved for transport or decoding failures.
/// Nothing returned here is trusted for safety, only for ordering.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn quote(
        &self,
        input_token: &str,
        output_token: &str,
        amount: Decimal,
        slippage_bps: u32,
    ) -> Result<Vec<Route>>;
}
