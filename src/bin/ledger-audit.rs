#![forbid(unsafe_code)]
//! Replay a chain snapshot from genesis and report every anomaly.

use clap::Parser;
use colored::*;
use hashledger::audit::{AuditMode, ChainAuditor};
use hashledger::cli::{init_tracing, print_report};
use hashledger::error::ChainError;
use hashledger::persistence::load_chain;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Chain snapshot written by `ledger-demo --out`
    chain: PathBuf,
    /// Abort at the first finding
    #[arg(long)]
    strict: bool,
    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let chain = load_chain(&cli.chain)?;
    let mode = if cli.strict { AuditMode::Strict } else { AuditMode::Collect };

    let report = match ChainAuditor::new(mode).audit(&chain) {
        Ok(report) => report,
        Err(ChainError::AuditAborted { finding }) => {
            eprintln!("{} {}", "❌ Audit aborted:".red().bold(), finding);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
