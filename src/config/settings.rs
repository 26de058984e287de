//! Agent configuration settings and environment variable handling

use anyhow::Result;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use crate::{events::DEFAULT_EVENT_CAPACITY, storage::DEFAULT_MAX_HISTORY_SIZE, types::TradeConfig};

// Risk envelope bounds
pub const DEFAULT_MAX_SLIPPAGE_BPS: u32 = 100; // 1%
pub const MAX_SLIPPAGE_BPS: u32 = 5000; // 50%, meme pairs can be thin
pub const DEFAULT_MAX_PRICE_IMPACT: Decimal = dec!(0.01);
pub const MAX_PRICE_IMPACT: Decimal = dec!(0.5);
pub const DEFAULT_MIN_LIQUIDITY: Decimal = dec!(1000);
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

// Execution timing
pub const SUBMIT_TIMEOUT_SECS: u64 = 30;
pub const ROUTE_TTL_SECS: u64 = 20;
pub const RETRY_INITIAL_DELAY_MS: u64 = 250;
pub const RETRY_MAX_DELAY_MS: u64 = 5000;

pub const DEFAULT_AGGREGATOR_URL: &str = "https://quote-api.jup.ag/v6";
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

#[derive(Debug, Clone)]
pub struct Config {
    // Default risk envelope
    pub trade: TradeConfig,
    // Execution
    pub submit_timeout_secs: u64,
    pub route_ttl_secs: u64,
    pub retry_initial_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    // History and notifications
    pub max_history_size: usize,
    pub event_channel_capacity: usize,
    pub output_dir: PathBuf,
    // Routing
    pub aggregator_url: String,
    pub quote_token: String,
    pub watch_tokens: Vec<String>,
    // Agent loop
    pub tick_interval_secs: u64,
    pub probe_amount: Decimal,
    // Paper trading
    pub paper_latency_ms: u64,
    pub paper_failure_rate: f64,
    pub paper_quote_balance: Decimal,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_decimal(key: &str) -> Option<Decimal> {
    env::var(key).ok().and_then(|s| Decimal::from_str(s.trim()).ok())
}

impl Config {
    pub fn load() -> Self {
        let trade = TradeConfig {
            max_slippage_bps: env_parse("MAX_SLIPPAGE_BPS")
                .unwrap_or(DEFAULT_MAX_SLIPPAGE_BPS)
                .min(MAX_SLIPPAGE_BPS),
            max_price_impact: env_decimal("MAX_PRICE_IMPACT")
                .unwrap_or(DEFAULT_MAX_PRICE_IMPACT)
                .max(dec!(0))
                .min(MAX_PRICE_IMPACT),
            min_liquidity: env_decimal("MIN_LIQUIDITY")
                .unwrap_or(DEFAULT_MIN_LIQUIDITY)
                .max(dec!(0)),
            retry_attempts: env_parse("RETRY_ATTEMPTS")
                .unwrap_or(DEFAULT_RETRY_ATTEMPTS)
                .clamp(1, MAX_RETRY_ATTEMPTS),
            use_priority_bundle: env_parse("USE_PRIORITY_BUNDLE").unwrap_or(false),
        };

        Self {
            trade,
            submit_timeout_secs: env_parse("SUBMIT_TIMEOUT_SECS")
                .unwrap_or(SUBMIT_TIMEOUT_SECS)
                .max(1),
            route_ttl_secs: env_parse("ROUTE_TTL_SECS").unwrap_or(ROUTE_TTL_SECS),
            retry_initial_delay_ms: env_parse("RETRY_INITIAL_DELAY_MS").unwrap_or(RETRY_INITIAL_DELAY_MS),
            retry_max_delay_ms: env_parse("RETRY_MAX_DELAY_MS").unwrap_or(RETRY_MAX_DELAY_MS),
            max_history_size: env_parse("MAX_HISTORY_SIZE")
                .unwrap_or(DEFAULT_MAX_HISTORY_SIZE)
                .max(1),
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY")
                .unwrap_or(DEFAULT_EVENT_CAPACITY)
                .max(1),
            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
            aggregator_url: env::var("AGGREGATOR_URL")
                .unwrap_or_else(|_| DEFAULT_AGGREGATOR_URL.to_string()),
            quote_token: env::var("QUOTE_TOKEN").unwrap_or_else(|_| WSOL_MINT.to_string()),
            watch_tokens: env::var("WATCH_TOKENS")
                .map(|s| {
                    s.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            tick_interval_secs: env_parse::<u64>("TICK_INTERVAL_SECS").unwrap_or(10).max(1),
            probe_amount: env_decimal("PROBE_AMOUNT")
                .unwrap_or(dec!(100_000_000)) // 0.1 SOL in lamports
                .max(dec!(1)),
            paper_latency_ms: env_parse("PAPER_LATENCY_MS").unwrap_or(400),
            paper_failure_rate: env_parse::<f64>("PAPER_FAILURE_RATE")
                .unwrap_or(0.1)
                .clamp(0.0, 1.0),
            paper_quote_balance: env_decimal("PAPER_QUOTE_BALANCE")
                .unwrap_or(dec!(1_000_000_000)) // 1 SOL in lamports
                .max(dec!(0)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.trade.validate()?;
        if self.watch_tokens.iter().any(|t| *t == self.quote_token) {
            return Err(anyhow::anyhow!("Quote token {} cannot also be a watched token", self.quote_token));
        }
        Ok(())
    }

    pub fn executions_dir(&self) -> PathBuf {
        self.output_dir.join("executions")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }
}
