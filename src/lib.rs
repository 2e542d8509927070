//! HashLedger - a minimal hash-linked balance ledger and its auditor
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the append-only chain, balances and block verification
//! - [`transaction`] - Transfer type and legality checks
//! - [`crypto`] - Hash commitments over canonical block contents
//!
//! ## Auditing
//! - [`audit`] - Full replay of a chain from genesis
//!
//! ## Production
//! - [`mempool`] - Pending transaction pool
//! - [`miner`] - Drains the pool into blocks
//! - [`generator`] - Random transfers for demos
//!
//! ## Configuration & Utilities
//! - [`cli`] - Output helpers shared by the binaries
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`persistence`] - JSON chain snapshots

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod crypto;
pub mod transaction;

// ============================================================================
// Auditing
// ============================================================================
pub mod audit;

// ============================================================================
// Production
// ============================================================================
pub mod generator;
pub mod mempool;
pub mod miner;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
pub mod persistence;

pub use audit::{audit_chain, AuditMode, AuditReport, ChainAuditor};
pub use blockchain::{Block, BlockContents, Chain, Finding, FindingKind, LedgerState};
pub use error::{ChainError, Result};
pub use transaction::{Transaction, TxnRejection};
