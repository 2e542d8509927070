#![forbid(unsafe_code)]
//! Build a ledger from generated transfers, then audit it from genesis.

use clap::Parser;
use colored::*;
use hashledger::audit::{AuditMode, ChainAuditor};
use hashledger::cli::{init_tracing, print_report, tamper_block};
use hashledger::config::{load_config, DEFAULT_CONFIG_PATH};
use hashledger::generator::TxnGenerator;
use hashledger::mempool::Mempool;
use hashledger::miner::BlockProducer;
use hashledger::persistence::save_chain;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults apply when it does not exist)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Override the generator seed
    #[arg(long)]
    seed: Option<u64>,
    /// Alter this block (by index) before auditing, without resealing it
    #[arg(long)]
    tamper: Option<usize>,
    /// Abort the audit at the first finding
    #[arg(long)]
    strict: bool,
    /// Write the produced chain to this JSON file
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    config.validate()?;
    let (payer, payee) = config.parties()?;
    let seed = cli.seed.unwrap_or(config.producer.seed);

    let mut generator = TxnGenerator::seeded(seed, &payer, &payee, config.producer.max_value);
    let mut pool: Mempool = generator.take_batch(config.producer.txn_count).into_iter().collect();

    let mut producer =
        BlockProducer::new(config.genesis_allocation(), config.producer.block_size_limit)?;
    let stats = producer.drain(&mut pool)?;

    println!("{}", "⛓️  Chain produced".bright_cyan().bold());
    println!("  Blocks appended:        {}", stats.blocks.to_string().bright_white());
    println!("  Transactions accepted:  {}", stats.accepted.to_string().bright_green());
    println!("  Transactions ignored:   {}", stats.rejected.to_string().yellow());
    println!("  Tip hash:               {}", producer.chain().tip().hash.dimmed());
    println!();

    let mut chain = producer.into_chain();
    if let Some(path) = &cli.out {
        save_chain(path, &chain)?;
        println!("💾 Chain written to {}", path.display());
        println!();
    }

    if let Some(index) = cli.tamper {
        chain = tamper_block(&chain, index)?;
        println!("{}", format!("⚠️  Block {} altered after sealing", index).yellow().bold());
        println!();
    }

    let mode = if cli.strict { AuditMode::Strict } else { config.audit.mode };
    let report = ChainAuditor::new(mode).audit(&chain)?;
    print_report(&report);

    Ok(())
}
