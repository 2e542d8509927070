//! Shared helpers for the command-line binaries

use crate::audit::AuditReport;
use crate::blockchain::{Block, Chain, LedgerState};
use crate::error::ChainError;
use crate::transaction::Transaction;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

/// Log to stderr, verbosity from `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn balances_table(state: &LedgerState) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Account").add_attribute(Attribute::Bold),
            Cell::new("Balance").add_attribute(Attribute::Bold),
        ]);
    for (account, balance) in state.iter() {
        table.add_row(vec![
            Cell::new(account),
            Cell::new(balance).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn print_report(report: &AuditReport) {
    println!(
        "{}",
        format!("🔎 Audited {} blocks", report.blocks_checked).bright_cyan().bold()
    );
    println!("{}", balances_table(&report.state));

    if report.is_clean() {
        println!("{}", "✅ Chain is valid: no findings".bright_green().bold());
        return;
    }

    println!(
        "{}",
        format!("❌ {} finding(s):", report.findings.len()).red().bold()
    );
    for finding in &report.findings {
        println!(
            "  {} {}",
            format!("[{}]", finding.kind()).yellow(),
            finding
        );
    }
}

/// Return a copy of `chain` with block `index` altered without resealing it:
/// the first transaction's deltas are negated, or the recorded transaction
/// count is bumped when the block is empty.
pub fn tamper_block(chain: &Chain, index: usize) -> Result<Chain, ChainError> {
    let mut blocks: Vec<Block> = chain.clone().into_blocks();
    let block = blocks.get_mut(index).ok_or_else(|| {
        ChainError::InvalidBlock(format!(
            "No block at index {} (chain has {})",
            index,
            chain.len()
        ))
    })?;

    match block.contents.txns.first_mut() {
        Some(txn) => {
            *txn = txn
                .iter()
                .map(|(account, delta)| (account, delta.saturating_neg()))
                .collect::<Transaction>();
        }
        None => block.contents.txn_count = block.contents.txn_count.wrapping_add(1),
    }
    Chain::from_blocks(blocks)
}
