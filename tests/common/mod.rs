#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use meme_swap_agent::{
    errors::SubmissionError,
    events::EventBus,
    execution::{ExecutorSettings, SignerContext, TradeExecutor, TransactionReceipt, TransactionSubmitter},
    network::{RetryConfig, RouteProvider},
    storage::TradeHistory,
    types::{Route, TradeConfig},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn route(in_amount: Decimal, out_amount: Decimal, impact: Decimal) -> Route {
    Route {
        in_amount,
        out_amount,
        min_out_amount: out_amount * dec!(0.995),
        hops: vec!["Raydium".to_string()],
        price_impact: impact,
        liquidity: dec!(1_000_000),
        fee: dec!(0.25),
        expires_at: Some(Utc::now() + ChronoDuration::seconds(30)),
    }
}

/// Replays scripted quote outcomes, then repeats the fallback.
pub struct ScriptedRoutes {
    script: Mutex<VecDeque<anyhow::Result<Vec<Route>>>>,
    fallback: Vec<Route>,
    delay: Duration,
    pub calls: AtomicU32,
}

impl ScriptedRoutes {
    pub fn always(routes: Vec<Route>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: routes,
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    pub fn then(self, outcome: anyhow::Result<Vec<Route>>) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteProvider for ScriptedRoutes {
    async fn quote(
        &self,
        _input_token: &str,
        _output_token: &str,
        _amount: Decimal,
        _slippage_bps: u32,
    ) -> anyhow::Result<Vec<Route>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Replays scripted submission outcomes; once exhausted every attempt fills
/// at the quoted output.
pub struct ScriptedSubmitter {
    script: Mutex<VecDeque<Result<Decimal, SubmissionError>>>,
    delay: Duration,
    pub calls: AtomicU32,
    pub last_signer: Mutex<Option<SignerContext>>,
}

impl ScriptedSubmitter {
    pub fn filling() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
            last_signer: Mutex::new(None),
        }
    }

    pub fn then(self, outcome: Result<Decimal, SubmissionError>) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn fail_times(mut self, times: usize, error: SubmissionError) -> Self {
        for _ in 0..times {
            self = self.then(Err(error.clone()));
        }
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSubmitter for ScriptedSubmitter {
    async fn submit(&self, route: &Route, signer: &SignerContext) -> Result<TransactionReceipt, SubmissionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_signer.lock().unwrap() = Some(*signer);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        let out_amount = next.unwrap_or(Ok(route.out_amount))?;
        Ok(TransactionReceipt {
            confirmation_id: format!("sig-{call}"),
            out_amount,
            fee: route.fee,
        })
    }
}

pub fn fast_settings() -> ExecutorSettings {
    ExecutorSettings {
        backoff: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            exponential_base: 2.0,
        },
        submit_timeout: Duration::from_secs(5),
        route_ttl: Duration::from_secs(20),
    }
}

pub struct Harness {
    pub routes: Arc<ScriptedRoutes>,
    pub submitter: Arc<ScriptedSubmitter>,
    pub executor: Arc<TradeExecutor>,
}

impl Harness {
    pub fn new(routes: ScriptedRoutes, submitter: ScriptedSubmitter) -> Self {
        Self::with(routes, submitter, TradeConfig::default(), fast_settings())
    }

    pub fn with(
        routes: ScriptedRoutes,
        submitter: ScriptedSubmitter,
        config: TradeConfig,
        settings: ExecutorSettings,
    ) -> Self {
        let routes = Arc::new(routes);
        let submitter = Arc::new(submitter);
        let executor = Arc::new(TradeExecutor::new(
            routes.clone(),
            submitter.clone(),
            Arc::new(TradeHistory::new(100)),
            EventBus::new(16),
            config,
            settings,
        ));
        Self {
            routes,
            submitter,
            executor,
        }
    }
}
