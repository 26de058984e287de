//! Meme Swap Agent - Main Entry Point
//!
//! Paper-trading loop: samples prices through the aggregator, feeds them to
//! the strategy engine and reports every trade outcome.

use meme_swap_agent::*;
use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use tokio::time;
use tracing::{debug, error, info, warn};
use meme_swap_agent::{
    events::EventBus,
    execution::{ExecutorSettings, PaperSubmitter, TradeExecutor},
    network::{JupiterRouteProvider, RouteProvider},
    storage::{self, TradeHistory},
    strategy::{RuleFire, StrategyEngine},
    utils::SessionStats,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = CONFIG.clone();
    config.validate()?;

    // Initialize logging
    utils::setup_output_directories(&config.output_dir)?;
    let _logging_guard = utils::setup_logging(&config.logs_dir())?;

    info!("🐸 Meme Swap Agent v0.1.0 - Paper Trading");
    info!("📋 Configuration:");
    info!("   Aggregator: {}", config.aggregator_url);
    info!("   Quote Token: {}", config.quote_token);
    info!("   Watching: {:?}", config.watch_tokens);
    info!("   Max Slippage: {} bps", config.trade.max_slippage_bps);
    info!("   Max Price Impact: {}%", config.trade.max_price_impact * dec!(100));
    info!("   Min Liquidity: {}", config.trade.min_liquidity);
    info!("   Retry Attempts: {}", config.trade.retry_attempts);
    info!("   Priority Bundling: {}", config.trade.use_priority_bundle);
    info!("   History Size: {}", config.max_history_size);
    info!("   ⚠️  PAPER MODE - No real funds at risk");

    if config.watch_tokens.is_empty() {
        warn!("WATCH_TOKENS is empty, nothing to trade");
    }

    // Wire the execution core
    let routes: Arc<dyn RouteProvider> = Arc::new(JupiterRouteProvider::new(
        config.aggregator_url.clone(),
        Duration::from_secs(config.route_ttl_secs),
    )?);
    let submitter = Arc::new(PaperSubmitter::new(config.paper_latency_ms, config.paper_failure_rate));
    let history = Arc::new(TradeHistory::new(config.max_history_size));
    let events = EventBus::new(config.event_channel_capacity);

    restore_history(&history, &config).await;

    let executor = Arc::new(TradeExecutor::new(
        Arc::clone(&routes),
        submitter,
        Arc::clone(&history),
        events.clone(),
        config.trade.clone(),
        ExecutorSettings::from_config(&config),
    ));

    let engine = StrategyEngine::new(Arc::clone(&executor));
    engine
        .add_strategy(default_strategy(&config))
        .await?;

    // Notification listener
    let dropped_events = Arc::new(AtomicU64::new(0));
    spawn_event_listener(&events, &config, Arc::clone(&dropped_events));

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    let shutdown_tx = Arc::new(tokio::sync::Mutex::new(Some(shutdown_tx)));

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        if let Some(tx) = shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
    });

    info!("\n🚀 Starting strategy loop...\n");

    let start_time = Instant::now();
    let mut state = LoopState::new(&config);
    let mut interval = time::interval(Duration::from_secs(config.tick_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_tick(routes.as_ref(), &engine, &config, &mut state).await;

                if state.stats.ticks % 30 == 0 {
                    state.stats.dropped_events = dropped_events.load(Ordering::Relaxed);
                    utils::print_session_stats(start_time, &state.stats, &history.summary().await);
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting strategy loop...");
                break;
            }
        }
    }

    // Final statistics and snapshot
    info!("\n🛑 Shutting down gracefully...");
    state.stats.dropped_events = dropped_events.load(Ordering::Relaxed);
    utils::print_session_stats(start_time, &state.stats, &history.summary().await);

    if let Err(e) = storage::save_history_snapshot(&config.executions_dir(), &history.list().await) {
        error!("Failed to save history snapshot: {}", e);
    }

    Ok(())
}

/// Per-token price memory and paper balances
struct LoopState {
    stats: SessionStats,
    last_price: HashMap<String, Decimal>,
    holdings: HashMap<String, Holdings>,
}

impl LoopState {
    fn new(config: &Config) -> Self {
        let holdings = config
            .watch_tokens
            .iter()
            .map(|token| {
                (
                    token.clone(),
                    Holdings {
                        token_balance: dec!(0),
                        quote_balance: config.paper_quote_balance,
                    },
                )
            })
            .collect();

        Self {
            stats: SessionStats::default(),
            last_price: HashMap::new(),
            holdings,
        }
    }

    fn apply(&mut self, fire: &RuleFire, token: &str) {
        let Ok(result) = &fire.outcome else {
            self.stats.failed += 1;
            return;
        };
        self.stats.executed += 1;

        let holdings = self.holdings.entry(token.to_string()).or_default();
        if result.output_token == token {
            holdings.quote_balance -= result.input_amount;
            holdings.token_balance += result.output_amount;
        } else {
            holdings.token_balance -= result.input_amount;
            holdings.quote_balance += result.output_amount;
        }
    }
}

/// Sample each watched token once and let the strategies react
async fn run_tick(
    routes: &dyn RouteProvider,
    engine: &StrategyEngine,
    config: &Config,
    state: &mut LoopState,
) {
    state.stats.ticks += 1;

    for token in &config.watch_tokens {
        let signals = match sample_signals(routes, config, token, state.last_price.get(token).copied()).await {
            Ok(signals) => signals,
            Err(e) => {
                warn!("Failed to sample {}: {}", token, e);
                continue;
            }
        };
        if let Some(price) = signals.price {
            state.last_price.insert(token.clone(), price);
        }

        info!(
            "💹 {} | Price: {} | Momentum: {}",
            token,
            signals.price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            signals.momentum.map(|m| format!("{:.2}%", m * dec!(100))).unwrap_or_else(|| "-".to_string()),
        );

        let holdings = state.holdings.get(token).copied().unwrap_or_default();
        let fires = engine.on_tick(token, signals, holdings).await;
        for fire in &fires {
            state.stats.rule_fires += 1;
            state.apply(fire, token);
        }
    }
}

/// Price is quote units per token, taken from a probe quote
async fn sample_signals(
    routes: &dyn RouteProvider,
    config: &Config,
    token: &str,
    previous: Option<Decimal>,
) -> Result<MarketSignals> {
    let candidates = routes
        .quote(&config.quote_token, token, config.probe_amount, config.trade.max_slippage_bps)
        .await?;

    let price = candidates
        .first()
        .filter(|route| route.out_amount > dec!(0))
        .map(|route| route.in_amount / route.out_amount);

    let momentum = match (price, previous) {
        (Some(now), Some(prev)) if prev > dec!(0) => Some((now - prev) / prev),
        _ => None,
    };

    debug!("Sampled {}: price={:?} momentum={:?}", token, price, momentum);

    Ok(MarketSignals {
        price,
        volume: None,
        momentum,
        signal: None,
    })
}

/// Sell everything on a sharp drop, take profit on a spike, buy a small
/// position on steady upward momentum
fn default_strategy(config: &Config) -> TradingStrategy {
    let rules = vec![
        TradeRule {
            priority: 1,
            condition: RuleCondition {
                signal: SignalType::Momentum,
                comparison: Comparison::LessThan(dec!(-0.15)),
            },
            action: RuleAction {
                direction: TradeDirection::Sell,
                amount: TradeAmount::All,
                urgency: ExecutionUrgency::High,
            },
        },
        TradeRule {
            priority: 2,
            condition: RuleCondition {
                signal: SignalType::Momentum,
                comparison: Comparison::GreaterThan(dec!(0.30)),
            },
            action: RuleAction {
                direction: TradeDirection::Sell,
                amount: TradeAmount::All,
                urgency: ExecutionUrgency::Normal,
            },
        },
        TradeRule {
            priority: 3,
            condition: RuleCondition {
                signal: SignalType::Momentum,
                comparison: Comparison::Between(dec!(0.02), dec!(0.10)),
            },
            action: RuleAction {
                direction: TradeDirection::Buy,
                amount: TradeAmount::Fixed(config.probe_amount),
                urgency: ExecutionUrgency::Low,
            },
        },
    ];

    TradingStrategy::new(
        "momentum",
        "Momentum rider",
        config.watch_tokens.clone(),
        config.quote_token.clone(),
        rules,
        config.trade.clone(),
    )
}

async fn restore_history(history: &TradeHistory, config: &Config) {
    match storage::load_history_snapshot(&config.executions_dir()) {
        Ok(trades) => {
            let restored = trades.len();
            for trade in trades {
                history.record(trade).await;
            }
            if restored > 0 {
                info!("📚 Restored {} trades from snapshot", restored);
            }
        }
        Err(e) => warn!("Could not restore history snapshot: {}", e),
    }
}

fn spawn_event_listener(events: &EventBus, config: &Config, dropped: Arc<AtomicU64>) {
    let mut rx = events.subscribe();
    let dir = config.executions_dir();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    utils::print_trade_event(&event);
                    if let TradeEvent::TradeExecuted(result) = &event {
                        if let Err(e) = storage::save_trade_result(&dir, result) {
                            error!("Failed to save trade result: {}", e);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    dropped.fetch_add(skipped, Ordering::Relaxed);
                    warn!("Event listener lagged, skipped {} notifications", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
