//! Jupiter-style aggregator route provider

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use crate::{
    network::{provider::RouteProvider, retry::{retry_with_backoff, RetryConfig}},
    types::Route,
};

const NO_ROUTE_ERROR_CODES: &[&str] = &["COULD_NOT_FIND_ANY_ROUTE", "TOKEN_NOT_TRADABLE"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    in_amount: Decimal,
    out_amount: Decimal,
    other_amount_threshold: Decimal,
    price_impact_pct: Decimal,
    #[serde(default)]
    route_plan: Vec<RoutePlanStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutePlanStep {
    swap_info: SwapInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapInfo {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    fee_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    #[serde(default)]
    error_code: Option<String>,
}

/// Quotes through an aggregator `/quote` endpoint. Amounts are in the
/// token's smallest unit; `priceImpactPct` is read as a fraction.
pub struct JupiterRouteProvider {
    client: reqwest::Client,
    base_url: String,
    route_ttl: Duration,
    retry: RetryConfig,
}

impl JupiterRouteProvider {
    pub fn new(base_url: impl Into<String>, route_ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            route_ttl,
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 200,
                ..Default::default()
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_quote(
        &self,
        input_token: &str,
        output_token: &str,
        amount: &str,
        slippage_bps: u32,
    ) -> Result<Option<QuoteResponse>> {
        let slippage = slippage_bps.to_string();
        let response = self
            .client
            .get(format!("{}/quote", self.base_url))
            .query(&[
                ("inputMint", input_token),
                ("outputMint", output_token),
                ("amount", amount),
                ("slippageBps", slippage.as_str()),
            ])
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if status.is_success() {
            let quote = response
                .json::<QuoteResponse>()
                .await
                .context("Failed to parse quote response")?;
            return Ok(Some(quote));
        }

        let body = response.text().await.unwrap_or_default();
        let error_code = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error_code);
        if error_code.as_deref().is_some_and(|code| NO_ROUTE_ERROR_CODES.contains(&code)) {
            debug!("Aggregator found no route {} -> {}: {}", input_token, output_token, body);
            return Ok(None);
        }

        warn!("⚠️ Aggregator returned error status {}: {}", status, body);
        Err(anyhow::anyhow!("Aggregator error: {} - {}", status, body))
    }

    fn to_route(&self, quote: QuoteResponse) -> Route {
        let hops = quote
            .route_plan
            .iter()
            .map(|step| step.swap_info.label.clone().unwrap_or_else(|| "unknown".to_string()))
            .collect();
        let fee = quote
            .route_plan
            .iter()
            .filter_map(|step| step.swap_info.fee_amount)
            .sum();

        Route {
            in_amount: quote.in_amount,
            out_amount: quote.out_amount,
            min_out_amount: quote.other_amount_threshold,
            hops,
            price_impact: quote.price_impact_pct,
            liquidity: implied_liquidity(quote.in_amount, quote.price_impact_pct),
            fee,
            expires_at: chrono::Duration::from_std(self.route_ttl)
                .ok()
                .map(|ttl| Utc::now() + ttl),
        }
    }
}

/// Constant-product estimate: impact ~ amount / depth, so depth ~ amount / impact.
pub fn implied_liquidity(in_amount: Decimal, price_impact: Decimal) -> Decimal {
    if price_impact <= dec!(0) {
        return Decimal::MAX;
    }
    in_amount.checked_div(price_impact).unwrap_or(Decimal::MAX)
}

#[async_trait]
impl RouteProvider for JupiterRouteProvider {
    async fn quote(
        &self,
        input_token: &str,
        output_token: &str,
        amount: Decimal,
        slippage_bps: u32,
    ) -> Result<Vec<Route>> {
        let base_units = amount.trunc();
        if base_units <= dec!(0) {
            return Err(anyhow::anyhow!(
                "Amount {} is below one base unit of {}",
                amount, input_token
            ));
        }
        let amount = base_units.normalize().to_string();

        let quote = retry_with_backoff(
            || self.fetch_quote(input_token, output_token, &amount, slippage_bps),
            &self.retry,
            "aggregator quote",
        )
        .await?;

        Ok(quote.map(|q| self.to_route(q)).into_iter().collect())
    }
}
