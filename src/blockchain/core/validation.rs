use crate::blockchain::core::chain::{Block, BlockHash};
use crate::blockchain::core::state::LedgerState;
use crate::crypto::HashCommitment;
use crate::transaction::{Transaction, TxnRejection};
use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FindingKind {
    InvalidTransaction,
    HashMismatch,
    NumberingError,
    LinkageError,
    CountMismatch,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FindingKind::InvalidTransaction => write!(f, "invalid transaction"),
            FindingKind::HashMismatch => write!(f, "hash mismatch"),
            FindingKind::NumberingError => write!(f, "numbering error"),
            FindingKind::LinkageError => write!(f, "linkage error"),
            FindingKind::CountMismatch => write!(f, "count mismatch"),
        }
    }
}

/// One anomaly detected while verifying a block.
///
/// `block_number` is the number recorded in the offending block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Finding {
    /// A transaction that is illegal against the replayed state. It was not
    /// applied.
    InvalidTransaction {
        block_number: u64,
        txn: Transaction,
        reason: TxnRejection,
    },
    HashMismatch {
        block_number: u64,
        expected: BlockHash,
        actual: BlockHash,
    },
    /// `expected` is `None` when the parent already holds the largest number.
    NumberingError {
        block_number: u64,
        expected: Option<u64>,
    },
    LinkageError {
        block_number: u64,
        expected: BlockHash,
        actual: BlockHash,
    },
    CountMismatch {
        block_number: u64,
        recorded: u64,
        actual: u64,
    },
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::InvalidTransaction { .. } => FindingKind::InvalidTransaction,
            Finding::HashMismatch { .. } => FindingKind::HashMismatch,
            Finding::NumberingError { .. } => FindingKind::NumberingError,
            Finding::LinkageError { .. } => FindingKind::LinkageError,
            Finding::CountMismatch { .. } => FindingKind::CountMismatch,
        }
    }

    pub fn block_number(&self) -> u64 {
        match self {
            Finding::InvalidTransaction { block_number, .. }
            | Finding::HashMismatch { block_number, .. }
            | Finding::NumberingError { block_number, .. }
            | Finding::LinkageError { block_number, .. }
            | Finding::CountMismatch { block_number, .. } => *block_number,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Finding::InvalidTransaction {
                block_number,
                txn,
                reason,
            } => write!(
                f,
                "Invalid transaction in block {}: {:?} ({})",
                block_number,
                txn.deltas(),
                reason
            ),
            Finding::HashMismatch {
                block_number,
                expected,
                actual,
            } => write!(
                f,
                "Hash does not match contents of block {}: expected {}, stored {}",
                block_number, expected, actual
            ),
            Finding::NumberingError {
                block_number,
                expected: Some(expected),
            } => write!(
                f,
                "Block number {} does not follow its parent (expected {})",
                block_number, expected
            ),
            Finding::NumberingError {
                block_number,
                expected: None,
            } => write!(
                f,
                "Block number {} does not follow its parent (parent has no successor)",
                block_number
            ),
            Finding::LinkageError {
                block_number,
                expected,
                actual,
            } => write!(
                f,
                "Block {} does not reference its parent: expected {:?}, recorded {:?}",
                block_number, expected, actual
            ),
            Finding::CountMismatch {
                block_number,
                recorded,
                actual,
            } => write!(
                f,
                "Block {} records {} transactions but carries {}",
                block_number, recorded, actual
            ),
        }
    }
}

/// Findings about the block's own seal: stored hash and transaction count.
pub fn check_block_hash(block: &Block) -> Vec<Finding> {
    let mut findings = Vec::new();
    let block_number = block.number();

    let expected = block.contents.commitment();
    if block.hash != expected {
        findings.push(Finding::HashMismatch {
            block_number,
            expected,
            actual: block.hash.clone(),
        });
    }

    let actual = block.contents.txns.len() as u64;
    if block.contents.txn_count != actual {
        findings.push(Finding::CountMismatch {
            block_number,
            recorded: block.contents.txn_count,
            actual,
        });
    }

    findings
}

/// Verify `block` as the successor of `parent`, replaying its transactions
/// onto `state`.
///
/// Every check runs and every anomaly is returned; nothing short-circuits.
/// Illegal transactions are reported and skipped, so the returned state is the
/// best-effort state after the legal ones.
pub fn verify_block(
    block: &Block,
    parent: &Block,
    mut state: LedgerState,
) -> (LedgerState, Vec<Finding>) {
    let block_number = block.number();
    let mut findings = Vec::new();

    for txn in &block.contents.txns {
        match txn.check(&state) {
            Ok(()) => state.apply_in_place(txn),
            Err(reason) => findings.push(Finding::InvalidTransaction {
                block_number,
                txn: txn.clone(),
                reason,
            }),
        }
    }

    findings.extend(check_block_hash(block));

    let expected_number = parent.number().checked_add(1);
    if expected_number != Some(block_number) {
        findings.push(Finding::NumberingError {
            block_number,
            expected: expected_number,
        });
    }

    if block.contents.parent_hash != parent.hash {
        findings.push(Finding::LinkageError {
            block_number,
            expected: parent.hash.clone(),
            actual: block.contents.parent_hash.clone(),
        });
    }

    for finding in &findings {
        warn!(block_number, kind = %finding.kind(), "{}", finding);
    }

    (state, findings)
}
