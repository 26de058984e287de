//! Trade result persistence (JSON lines)

use anyhow::Result;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::types::TradeResult;

pub fn save_trade_result(dir: &Path, result: &TradeResult) -> Result<PathBuf> {
    let filename = dir.join(format!("trades_{}.jsonl", Utc::now().format("%Y-%m-%d")));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(result)?)?;

    info!(
        trade_id = %result.id,
        output_amount = %result.output_amount,
        slippage = %result.slippage,
        "Saved trade result"
    );

    Ok(filename)
}

/// Writes the whole history window, oldest first, replacing any earlier snapshot.
pub fn save_history_snapshot(dir: &Path, trades: &[TradeResult]) -> Result<PathBuf> {
    let filename = dir.join("history_snapshot.jsonl");
    let tmp = dir.join("history_snapshot.jsonl.tmp");

    let mut file = fs::File::create(&tmp)?;
    for trade in trades {
        writeln!(file, "{}", serde_json::to_string(trade)?)?;
    }
    file.sync_all()?;
    fs::rename(&tmp, &filename)?;

    info!(trades = trades.len(), path = %filename.display(), "Saved history snapshot");
    Ok(filename)
}

pub fn load_history_snapshot(dir: &Path) -> Result<Vec<TradeResult>> {
    let filename = dir.join("history_snapshot.jsonl");
    if !filename.exists() {
        return Ok(Vec::new());
    }

    fs::read_to_string(&filename)?
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(anyhow::Error::from))
        .collect()
}
