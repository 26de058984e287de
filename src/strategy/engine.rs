//! Strategy rule engine
//!
//! Strategies are stored as `Arc<TradingStrategy>` and replaced wholesale on
//! every mutation. A tick clones the current list up front, so an evaluation
//! pass sees either the old or the new rules, never a mix.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use crate::{
    errors::{StrategyError, StrategyResult, TradeOutcome},
    execution::TradeExecutor,
    strategy::{
        advisor::Advisor,
        rules::{build_trade_params, first_match},
    },
    types::{
        Holdings, MarketSignals, SignalType, StrategyStatus, TradeParams, TradeResult, TradeRule,
        TradingStrategy,
    },
};

/// One rule firing and what became of the trade it requested.
#[derive(Debug)]
pub struct RuleFire {
    pub strategy_id: String,
    pub rule_priority: u32,
    pub params: TradeParams,
    pub outcome: TradeOutcome,
}

pub struct StrategyEngine {
    strategies: RwLock<Vec<Arc<TradingStrategy>>>,
    executor: Arc<TradeExecutor>,
    advisor: Option<Arc<dyn Advisor>>,
}

impl StrategyEngine {
    pub fn new(executor: Arc<TradeExecutor>) -> Self {
        Self {
            strategies: RwLock::new(Vec::new()),
            executor,
            advisor: None,
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn Advisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub async fn add_strategy(&self, strategy: TradingStrategy) -> StrategyResult<()> {
        strategy.config.validate().map_err(|source| StrategyError::InvalidConfig {
            id: strategy.id.clone(),
            source,
        })?;
        check_rules(&strategy.id, strategy.rules())?;

        let mut strategies = self.strategies.write().await;
        if strategies.iter().any(|s| s.id == strategy.id) {
            return Err(StrategyError::Duplicate(strategy.id));
        }

        info!(
            "🎯 Registered strategy {} ({}) with {} rules over {:?}",
            strategy.id,
            strategy.name,
            strategy.rules().len(),
            strategy.tokens
        );
        strategies.push(Arc::new(strategy));
        Ok(())
    }

    pub async fn remove_strategy(&self, id: &str) -> StrategyResult<Arc<TradingStrategy>> {
        let mut strategies = self.strategies.write().await;
        let index = strategies
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StrategyError::NotFound(id.to_string()))?;
        Ok(strategies.remove(index))
    }

    pub async fn pause(&self, id: &str) -> StrategyResult<()> {
        self.update(id, |s| s.status = StrategyStatus::Paused).await?;
        info!("⏸️  Strategy {} paused", id);
        Ok(())
    }

    pub async fn resume(&self, id: &str) -> StrategyResult<()> {
        self.update(id, |s| s.status = StrategyStatus::Active).await?;
        info!("▶️  Strategy {} resumed", id);
        Ok(())
    }

    pub async fn add_rule(&self, id: &str, rule: TradeRule) -> StrategyResult<()> {
        check_rules(id, std::slice::from_ref(&rule))?;
        self.update(id, |s| s.add_rule(rule)).await
    }

    pub async fn set_rules(&self, id: &str, rules: Vec<TradeRule>) -> StrategyResult<()> {
        check_rules(id, &rules)?;
        self.update(id, |s| s.set_rules(rules)).await
    }

    pub async fn strategy(&self, id: &str) -> Option<Arc<TradingStrategy>> {
        self.strategies.read().await.iter().find(|s| s.id == id).cloned()
    }

    /// Snapshot of all strategies in registration order.
    pub async fn strategies(&self) -> Vec<Arc<TradingStrategy>> {
        self.strategies.read().await.clone()
    }

    /// Executed trades touching `token`, oldest first.
    pub async fn trades_for(&self, token: &str) -> Vec<TradeResult> {
        self.executor
            .history()
            .list()
            .await
            .into_iter()
            .filter(|t| t.input_token == token || t.output_token == token)
            .collect()
    }

    /// Rule that would fire for these signals, ignoring status.
    pub fn evaluate<'a>(strategy: &'a TradingStrategy, signals: &MarketSignals) -> Option<&'a TradeRule> {
        first_match(strategy.rules(), signals)
    }

    /// Evaluates every active strategy trading `token` and executes the first
    /// matching rule of each, concurrently. Failed trades are reported, not retried.
    pub async fn on_tick(&self, token: &str, signals: MarketSignals, holdings: Holdings) -> Vec<RuleFire> {
        let snapshot: Vec<Arc<TradingStrategy>> = self
            .strategies()
            .await
            .into_iter()
            .filter(|s| s.is_active() && s.applies_to(token))
            .collect();

        if snapshot.is_empty() {
            return Vec::new();
        }

        let signals = self.with_advice(token, signals, &snapshot).await;

        let mut tasks = JoinSet::new();
        for (index, strategy) in snapshot.into_iter().enumerate() {
            let Some(rule) = Self::evaluate(&strategy, &signals) else {
                debug!("No rule matched for strategy {} on {}", strategy.id, token);
                continue;
            };
            let Some(params) = build_trade_params(&strategy, token, &rule.action, &holdings) else {
                debug!(
                    "Rule {} of strategy {} matched but resolved to no amount",
                    rule.priority, strategy.id
                );
                continue;
            };

            info!(
                "📈 Strategy {} fired rule {} ({:?} {:?})",
                strategy.id, rule.priority, rule.action.direction, rule.condition.signal
            );

            let rule_priority = rule.priority;
            let executor = Arc::clone(&self.executor);
            tasks.spawn(async move {
                let outcome = executor.execute_trade_with(params.clone(), &strategy.config).await;
                (
                    index,
                    RuleFire {
                        strategy_id: strategy.id.clone(),
                        rule_priority,
                        params,
                        outcome,
                    },
                )
            });
        }

        let mut fires = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(fire) => fires.push(fire),
                Err(e) => error!("Strategy trade task aborted: {}", e),
            }
        }
        fires.sort_by_key(|(index, _)| *index);
        fires.into_iter().map(|(_, fire)| fire).collect()
    }

    async fn with_advice(
        &self,
        token: &str,
        mut signals: MarketSignals,
        strategies: &[Arc<TradingStrategy>],
    ) -> MarketSignals {
        let Some(advisor) = &self.advisor else {
            return signals;
        };
        let wants_advice = strategies
            .iter()
            .flat_map(|s| s.rules())
            .any(|r| r.condition.signal == SignalType::Signal);
        if signals.signal.is_some() || !wants_advice {
            return signals;
        }

        match advisor.signal(token).await {
            Ok(score) => signals.signal = Some(score),
            Err(e) => warn!("Advisor unavailable for {}: {}", token, e),
        }
        signals
    }

    async fn update<F>(&self, id: &str, mutate: F) -> StrategyResult<()>
    where
        F: FnOnce(&mut TradingStrategy),
    {
        let mut strategies = self.strategies.write().await;
        let slot = strategies
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StrategyError::NotFound(id.to_string()))?;

        let mut next = TradingStrategy::clone(slot);
        mutate(&mut next);
        *slot = Arc::new(next);
        Ok(())
    }
}

fn check_rules(id: &str, rules: &[TradeRule]) -> StrategyResult<()> {
    match rules.iter().find(|r| !r.condition.comparison.is_well_formed()) {
        Some(rule) => Err(StrategyError::InvalidConfig {
            id: id.to_string(),
            source: anyhow::anyhow!(
                "rule {} has an inverted range: {:?}",
                rule.priority,
                rule.condition.comparison
            ),
        }),
        None => Ok(()),
    }
}
