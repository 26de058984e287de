//! Trade execution engine
//!
//! Turns a `TradeParams` into a confirmed `TradeResult`:
//! validate params, quote, take the provider's top route, check it against
//! the risk envelope, submit (retrying transient failures with the same
//! route unless it expired), normalize, record, notify.

use chrono::Utc;
use rust_decimal_macros::dec;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use crate::{
    config::Config,
    errors::{ExecutionStage, SubmissionError, TradeError},
    events::EventBus,
    execution::submitter::{SignerContext, TransactionReceipt, TransactionSubmitter},
    network::{RetryConfig, RouteProvider},
    storage::TradeHistory,
    types::{Route, TradeConfig, TradeParams, TradeResult},
    validation::{check_limit_price, validate_params, validate_route},
};

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Delay schedule between submission attempts. The attempt bound comes
    /// from `TradeConfig::retry_attempts`.
    pub backoff: RetryConfig,
    pub submit_timeout: Duration,
    /// Validity given to routes the provider did not stamp with an expiry.
    pub route_ttl: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            backoff: RetryConfig {
                initial_delay_ms: 250,
                ..Default::default()
            },
            submit_timeout: Duration::from_secs(30),
            route_ttl: Duration::from_secs(20),
        }
    }
}

impl ExecutorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backoff: RetryConfig {
                max_attempts: config.trade.submission_attempts(),
                initial_delay_ms: config.retry_initial_delay_ms,
                max_delay_ms: config.retry_max_delay_ms,
                exponential_base: 2.0,
            },
            submit_timeout: Duration::from_secs(config.submit_timeout_secs),
            route_ttl: Duration::from_secs(config.route_ttl_secs),
        }
    }
}

pub struct TradeExecutor {
    routes: Arc<dyn RouteProvider>,
    submitter: Arc<dyn TransactionSubmitter>,
    history: Arc<TradeHistory>,
    events: EventBus,
    default_config: RwLock<Arc<TradeConfig>>,
    settings: ExecutorSettings,
}

impl TradeExecutor {
    pub fn new(
        routes: Arc<dyn RouteProvider>,
        submitter: Arc<dyn TransactionSubmitter>,
        history: Arc<TradeHistory>,
        events: EventBus,
        default_config: TradeConfig,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            routes,
            submitter,
            history,
            events,
            default_config: RwLock::new(Arc::new(default_config)),
            settings,
        }
    }

    pub fn history(&self) -> &Arc<TradeHistory> {
        &self.history
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn default_config(&self) -> Arc<TradeConfig> {
        self.default_config.read().await.clone()
    }

    /// Replaces the default envelope. Trades already running keep the one they started with.
    pub async fn set_default_config(&self, config: TradeConfig) -> anyhow::Result<()> {
        config.validate()?;
        *self.default_config.write().await = Arc::new(config);
        Ok(())
    }

    pub async fn execute_trade(&self, params: TradeParams) -> Result<TradeResult, TradeError> {
        let config = self.default_config().await;
        self.execute_trade_with(params, &config).await
    }

    /// Executes under an explicit envelope, e.g. a strategy's own config.
    pub async fn execute_trade_with(
        &self,
        params: TradeParams,
        config: &TradeConfig,
    ) -> Result<TradeResult, TradeError> {
        let config = config.clone();
        let started = Instant::now();

        info!(
            "🚀 Executing {} {} -> {} ({:?})",
            params.amount, params.input_token, params.output_token, params.order_type
        );

        match self.run(&params, &config).await {
            Ok(result) => {
                info!(
                    trade_id = %result.id,
                    output_amount = %result.output_amount,
                    price = %result.execution_price,
                    attempts = result.attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "✅ Trade confirmed: {}",
                    result.confirmation_id
                );
                self.events.trade_executed(&result);
                Ok(result)
            }
            Err(e) => {
                warn!(
                    kind = ?e.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "❌ Trade {} -> {} failed: {}",
                    params.input_token, params.output_token, e
                );
                self.events.trade_failed(&params, &e);
                Err(e)
            }
        }
    }

    async fn run(&self, params: &TradeParams, config: &TradeConfig) -> Result<TradeResult, TradeError> {
        validate_params(params)?;

        let slippage_bps = params.slippage_bps.unwrap_or(config.max_slippage_bps);
        let signer = SignerContext::new(config.use_priority_bundle, params.urgency);
        let max_attempts = config.submission_attempts();

        let mut route = self.accept_route(params, config, slippage_bps).await?;
        let mut attempt = 0;

        let receipt = loop {
            attempt += 1;

            if route.is_expired(Utc::now()) {
                info!("⏳ Route expired before attempt {}, re-quoting", attempt);
                route = self.accept_route(params, config, slippage_bps).await?;
            }

            match self.submit_once(params, &route, &signer).await? {
                Ok(receipt) => break receipt,
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.settings.backoff.delay_after(attempt);
                    warn!(
                        "Submission attempt {}/{} failed: {}. Retrying in {}ms...",
                        attempt, max_attempts, e, delay.as_millis()
                    );
                    self.backoff(params, delay).await?;
                }
                Err(e) => {
                    return Err(TradeError::ExecutionFailed { attempts: attempt, source: e });
                }
            }
        };

        let result = normalize(params, &route, receipt, attempt)?;
        self.history.record(result.clone()).await;
        Ok(result)
    }

    /// Quote, take the top-ranked candidate and run it through the risk checks.
    async fn accept_route(
        &self,
        params: &TradeParams,
        config: &TradeConfig,
        slippage_bps: u32,
    ) -> Result<Route, TradeError> {
        let quote = self.routes.quote(
            &params.input_token,
            &params.output_token,
            params.amount,
            slippage_bps,
        );
        let candidates = within_deadline(params, ExecutionStage::Quote, quote)
            .await?
            .map_err(|e| TradeError::NoRoute {
                input_token: params.input_token.clone(),
                output_token: params.output_token.clone(),
                detail: Some(format!("{:#}", e)),
            })?;

        let candidate_count = candidates.len();
        let mut route = candidates.into_iter().next().ok_or_else(|| TradeError::NoRoute {
            input_token: params.input_token.clone(),
            output_token: params.output_token.clone(),
            detail: None,
        })?;

        validate_route(&route, config).map_err(TradeError::RouteRejected)?;
        if let Some(limit) = params.limit_price {
            check_limit_price(&route, limit).map_err(TradeError::RouteRejected)?;
        }

        if route.expires_at.is_none() {
            route.expires_at = chrono::Duration::from_std(self.settings.route_ttl)
                .ok()
                .map(|ttl| Utc::now() + ttl);
        }

        debug!(
            candidates = candidate_count,
            hops = ?route.hops,
            impact = %route.price_impact,
            "Accepted route"
        );
        Ok(route)
    }

    /// The deadline only gates starting an attempt. A broadcast transaction
    /// cannot be recalled, so an attempt in flight runs until it resolves or
    /// `submit_timeout` elapses.
    async fn submit_once(
        &self,
        params: &TradeParams,
        route: &Route,
        signer: &SignerContext,
    ) -> Result<Result<TransactionReceipt, SubmissionError>, TradeError> {
        if params.is_past_deadline(Utc::now()) {
            return Err(TradeError::DeadlineExceeded { stage: ExecutionStage::Submission });
        }

        let timeout = self.settings.submit_timeout;
        match tokio::time::timeout(timeout, self.submitter.submit(route, signer)).await {
            Ok(outcome) => Ok(outcome),
            Err(_) => Ok(Err(SubmissionError::Timeout(timeout))),
        }
    }

    async fn backoff(&self, params: &TradeParams, delay: Duration) -> Result<(), TradeError> {
        if remaining(params).is_some_and(|left| left <= delay) {
            return Err(TradeError::DeadlineExceeded { stage: ExecutionStage::Backoff });
        }
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Time left before the deadline; `None` when the trade has none.
fn remaining(params: &TradeParams) -> Option<Duration> {
    params
        .deadline
        .map(|deadline| (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO))
}

async fn within_deadline<F: Future>(
    params: &TradeParams,
    stage: ExecutionStage,
    fut: F,
) -> Result<F::Output, TradeError> {
    if params.is_past_deadline(Utc::now()) {
        return Err(TradeError::DeadlineExceeded { stage });
    }
    match remaining(params) {
        None => Ok(fut.await),
        Some(left) => tokio::time::timeout(left, fut)
            .await
            .map_err(|_| TradeError::DeadlineExceeded { stage }),
    }
}

fn normalize(
    params: &TradeParams,
    route: &Route,
    receipt: TransactionReceipt,
    attempts: u32,
) -> Result<TradeResult, TradeError> {
    let invalid = |reason: String| TradeError::ExecutionFailed {
        attempts,
        source: SubmissionError::InvalidReceipt(reason),
    };

    if receipt.out_amount <= dec!(0) {
        return Err(invalid(format!(
            "{} confirmed with output {}",
            receipt.confirmation_id, receipt.out_amount
        )));
    }

    let execution_price = receipt
        .out_amount
        .checked_div(route.in_amount)
        .ok_or_else(|| invalid("execution price out of range".to_string()))?;
    let slippage = (route.out_amount - receipt.out_amount)
        .checked_div(route.out_amount)
        .ok_or_else(|| invalid("slippage out of range".to_string()))?;

    Ok(TradeResult {
        id: uuid::Uuid::new_v4().to_string(),
        input_token: params.input_token.clone(),
        output_token: params.output_token.clone(),
        input_amount: route.in_amount,
        output_amount: receipt.out_amount,
        execution_price,
        slippage,
        price_impact: route.price_impact,
        fee: receipt.fee,
        hops: route.hops.clone(),
        confirmation_id: receipt.confirmation_id,
        attempts,
        completed_at: Utc::now(),
    })
}
