//! Block production: drains the pending pool into blocks on the chain.
//!
//! The producer is the single writer of its chain. Each pending transaction is
//! checked against the running state and applied before it is included, so
//! every block it appends replays cleanly.

use crate::blockchain::{Block, Chain, LedgerState};
use crate::error::ChainError;
use crate::mempool::Mempool;
use crate::transaction::Transaction;
use tracing::{debug, warn};

/// Counters for one or more production rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductionStats {
    pub blocks: usize,
    pub accepted: usize,
    pub rejected: usize,
}

pub struct BlockProducer {
    chain: Chain,
    state: LedgerState,
    block_size_limit: usize,
}

impl BlockProducer {
    /// Start a new chain from `allocation`.
    pub fn new(allocation: Transaction, block_size_limit: usize) -> Result<Self, ChainError> {
        if block_size_limit == 0 {
            return Err(ChainError::Config(
                "block_size_limit must be at least 1".to_string(),
            ));
        }

        let state = LedgerState::new().apply(&allocation);
        Ok(Self {
            chain: Chain::genesis(allocation),
            state,
            block_size_limit,
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Balances after every block produced so far.
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_chain(self) -> Chain {
        self.chain
    }

    /// Gather up to `block_size_limit` legal transactions from `pool` and
    /// append them as one block.
    ///
    /// Illegal transactions are dropped. A block is appended even when every
    /// gathered transaction was dropped.
    pub fn produce_block(&mut self, pool: &mut Mempool) -> Result<ProductionStats, ChainError> {
        let mut stats = ProductionStats::default();
        let mut accepted = Vec::with_capacity(self.block_size_limit);

        while accepted.len() < self.block_size_limit {
            let Some(txn) = pool.pop() else { break };
            match txn.check(&self.state) {
                Ok(()) => {
                    self.state.apply_in_place(&txn);
                    accepted.push(txn);
                }
                Err(reason) => {
                    warn!(txn = ?txn.deltas(), %reason, "ignored transaction");
                    stats.rejected += 1;
                }
            }
        }

        stats.accepted = accepted.len();
        let block = Block::assemble(accepted, self.chain.tip())?;
        debug!(
            block_number = block.number(),
            txns = stats.accepted,
            "assembled block"
        );
        self.chain.append(block)?;
        stats.blocks = 1;
        Ok(stats)
    }

    /// Produce blocks until `pool` is empty.
    pub fn drain(&mut self, pool: &mut Mempool) -> Result<ProductionStats, ChainError> {
        let mut total = ProductionStats::default();
        while !pool.is_empty() {
            let round = self.produce_block(pool)?;
            total.blocks += round.blocks;
            total.accepted += round.accepted;
            total.rejected += round.rejected;
        }
        Ok(total)
    }
}
