//! Display and printing utilities

use std::time::Instant;
use rust_decimal_macros::dec;
use tracing::{error, info, warn};
use crate::{
    storage::HistorySummary,
    types::{TradeEvent, TradeResult},
};

#[derive(Debug, Default)]
pub struct SessionStats {
    pub ticks: u64,
    pub rule_fires: u64,
    pub executed: u64,
    pub failed: u64,
    pub dropped_events: u64,
}

pub fn print_session_stats(start_time: Instant, stats: &SessionStats, history: &HistorySummary) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   🎯 STRATEGIES:");
    info!("     Ticks evaluated: {}", stats.ticks);
    info!("     Rules fired: {}", stats.rule_fires);

    info!("   🚀 TRADE EXECUTION:");
    info!("     Executed: {}", stats.executed);
    info!("     Failed: {}", stats.failed);
    info!("     Success rate: {:.1}%",
        if stats.executed + stats.failed > 0 {
            (stats.executed as f64 / (stats.executed + stats.failed) as f64) * 100.0
        } else {
            0.0
        }
    );

    info!("   📚 HISTORY WINDOW:");
    info!("     Trades: {}", history.trades);
    info!("     Avg slippage: {:.3}%", history.avg_slippage * dec!(100));
    info!("     Avg price impact: {:.3}%", history.avg_price_impact * dec!(100));
    info!("     Total fees: {}", history.total_fees);

    if stats.dropped_events > 0 {
        warn!("   ⚠️  Notifications dropped by lagging listener: {}", stats.dropped_events);
    }

    info!("");
}

pub fn print_trade_result(result: &TradeResult) {
    warn!("\n✅ TRADE EXECUTED #{}", result.id);
    warn!("💱 {} {} -> {} {}",
        result.input_amount, result.input_token, result.output_amount, result.output_token
    );
    warn!("   Price: {}", result.execution_price);
    warn!("   Slippage: {:.3}%", result.slippage * dec!(100));
    warn!("   Price Impact: {:.3}%", result.price_impact * dec!(100));
    warn!("   Fee: {}", result.fee);
    warn!("   Route: {}", result.hops.join(" -> "));
    warn!("   Confirmation: {} (attempts: {})", result.confirmation_id, result.attempts);
}

pub fn print_trade_event(event: &TradeEvent) {
    match event {
        TradeEvent::TradeExecuted(result) => print_trade_result(result),
        TradeEvent::TradeFailed { input_token, output_token, kind, reason, .. } => {
            error!("\n❌ TRADE FAILED {} -> {}", input_token, output_token);
            error!("   Kind: {:?}", kind);
            error!("   Reason: {}", reason);
        }
    }
}
