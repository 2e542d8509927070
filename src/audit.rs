//! Full-chain replay for HashLedger
//!
//! The auditor walks a chain from the genesis block, re-checks every block and
//! every transaction, and rebuilds the account balances from scratch. It only
//! reads the chain; it never modifies or rejects it. Whether findings make the
//! chain unacceptable is left to the caller.

use crate::blockchain::{check_block_hash, verify_block, Block, Chain, Finding, LedgerState};
use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{debug, info, warn};

/// What the auditor does when it meets a finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// Record every finding and keep replaying on the best-effort state.
    #[default]
    Collect,
    /// Stop at the first block that produces a finding.
    Strict,
}

/// Outcome of a completed replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Balances after replaying every legal transaction.
    pub state: LedgerState,
    pub findings: Vec<Finding>,
    /// Number of blocks visited, genesis included.
    pub blocks_checked: usize,
}

impl AuditReport {
    /// No findings: the chain is fully valid.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings recorded against blocks carrying `block_number`.
    pub fn findings_for(&self, block_number: u64) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |f| f.block_number() == block_number)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChainAuditor {
    mode: AuditMode,
}

impl ChainAuditor {
    pub fn new(mode: AuditMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AuditMode {
        self.mode
    }

    /// Replay `chain` from genesis.
    ///
    /// In collect mode this always returns `Ok`. In strict mode the first
    /// finding aborts the replay with [`ChainError::AuditAborted`].
    pub fn audit(&self, chain: &Chain) -> Result<AuditReport, ChainError> {
        replay(chain, |findings| match (self.mode, findings.first()) {
            (AuditMode::Strict, Some(first)) => Err(ChainError::AuditAborted {
                finding: Box::new(first.clone()),
            }),
            _ => Ok(()),
        })
    }
}

/// Walk the chain, handing each batch of findings to `gate` before recording
/// it. An error from `gate` stops the walk.
fn replay<E>(
    chain: &Chain,
    mut gate: impl FnMut(&[Finding]) -> Result<(), E>,
) -> Result<AuditReport, E> {
    let genesis = chain.genesis_block();
    let mut findings = check_genesis(genesis);
    gate(&findings)?;

    // Genesis transactions define the initial supply and are trusted.
    let mut state = LedgerState::new();
    for txn in genesis.transactions() {
        state.apply_in_place(txn);
    }
    debug!(accounts = state.len(), "genesis applied");

    let mut parent = genesis;
    for block in chain.iter().skip(1) {
        let (next, block_findings) = verify_block(block, parent, state);
        state = next;
        gate(&block_findings)?;
        findings.extend(block_findings);
        parent = block;
    }

    let report = AuditReport {
        state,
        findings,
        blocks_checked: chain.len(),
    };
    info!(
        blocks = report.blocks_checked,
        findings = report.findings.len(),
        "chain audit complete"
    );
    Ok(report)
}

/// Structural checks on the genesis block. Its transactions are not checked.
fn check_genesis(genesis: &Block) -> Vec<Finding> {
    let mut findings = check_block_hash(genesis);
    let block_number = genesis.number();

    if block_number != 0 {
        findings.push(Finding::NumberingError {
            block_number,
            expected: Some(0),
        });
    }

    if !genesis.contents.parent_hash.is_empty() {
        findings.push(Finding::LinkageError {
            block_number,
            expected: String::new(),
            actual: genesis.contents.parent_hash.clone(),
        });
    }

    for finding in &findings {
        warn!(block_number, kind = %finding.kind(), "{}", finding);
    }
    findings
}

/// Replay `chain` collecting every finding.
pub fn audit_chain(chain: &Chain) -> AuditReport {
    match replay(chain, |_| Ok::<(), Infallible>(())) {
        Ok(report) => report,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{BlockContents, FindingKind};
    use crate::transaction::Transaction;

    fn build_chain() -> Chain {
        let mut chain = Chain::genesis(Transaction::from_iter([("A", 100), ("B", 100)]));
        let batches = vec![
            vec![Transaction::transfer("A", "B", 10)],
            vec![Transaction::transfer("B", "A", 30), Transaction::transfer("A", "B", 5)],
            vec![Transaction::transfer("B", "A", 1)],
        ];
        for batch in batches {
            let block = Block::assemble(batch, chain.tip()).unwrap();
            chain.append(block).unwrap();
        }
        chain
    }

    fn tamper(chain: Chain, edit: impl FnOnce(&mut Vec<Block>)) -> Chain {
        let mut blocks = chain.into_blocks();
        edit(&mut blocks);
        Chain::from_blocks(blocks).unwrap()
    }

    #[test]
    fn test_clean_chain_reproduces_state() {
        let report = ChainAuditor::default().audit(&build_chain()).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.blocks_checked, 4);
        assert_eq!(report.state, LedgerState::from_iter([("A", 116), ("B", 84)]));
    }

    #[test]
    fn test_genesis_only_chain() {
        let chain = Chain::genesis(Transaction::from_iter([("A", 7)]));
        let report = audit_chain(&chain);

        assert!(report.is_clean());
        assert_eq!(report.state.balance("A"), 7);
        assert_eq!(report.blocks_checked, 1);
    }

    #[test]
    fn test_genesis_need_not_conserve() {
        // Genesis creates supply; this allocation sums to 200.
        let report = audit_chain(&Chain::genesis(Transaction::from_iter([("A", 100), ("B", 100)])));
        assert!(report.is_clean());
        assert_eq!(report.state.total_supply(), 200);
    }

    #[test]
    fn test_flipped_delta_is_detected() {
        let chain = tamper(build_chain(), |blocks| {
            blocks[2].contents.txns[0] = Transaction::transfer("B", "A", 31);
        });
        let report = audit_chain(&chain);

        assert!(!report.is_clean());
        assert!(report
            .findings_for(2)
            .any(|f| f.kind() == FindingKind::HashMismatch));
    }

    #[test]
    fn test_tampered_genesis_is_detected() {
        let chain = tamper(build_chain(), |blocks| {
            blocks[0].contents.txns[0] = Transaction::from_iter([("A", 1_000), ("B", 100)]);
        });
        let report = audit_chain(&chain);

        let kinds: Vec<_> = report.findings_for(0).map(Finding::kind).collect();
        assert_eq!(kinds, vec![FindingKind::HashMismatch]);
    }

    #[test]
    fn test_replaced_parent_hash_reports_linkage_error() {
        let chain = tamper(build_chain(), |blocks| {
            blocks[1].contents.parent_hash = "deadbeef".to_string();
        });
        let report = audit_chain(&chain);

        assert!(report
            .findings_for(1)
            .any(|f| f.kind() == FindingKind::LinkageError));
    }

    #[test]
    fn test_numbering_error_does_not_stop_audit() {
        let chain = tamper(build_chain(), |blocks| {
            blocks[2].contents.block_number = 42;
        });
        let report = ChainAuditor::new(AuditMode::Collect).audit(&chain).unwrap();

        assert!(report
            .findings_for(42)
            .any(|f| f.kind() == FindingKind::NumberingError));
        // Block 3 follows a parent numbered 42 now.
        assert!(report
            .findings_for(3)
            .any(|f| f.kind() == FindingKind::NumberingError));
        assert_eq!(report.blocks_checked, 4);
        // All transactions were still legal, so balances are unaffected.
        assert_eq!(report.state, LedgerState::from_iter([("A", 116), ("B", 84)]));
    }

    #[test]
    fn test_blocks_at_max_number_report_numbering_errors() {
        let genesis = Block::genesis(Transaction::from_iter([("A", 100), ("B", 100)]));
        let first = Block::new(BlockContents {
            block_number: u64::MAX,
            parent_hash: genesis.hash.clone(),
            txn_count: 0,
            txns: vec![],
        });
        let second = Block::new(BlockContents {
            block_number: u64::MAX,
            parent_hash: first.hash.clone(),
            txn_count: 0,
            txns: vec![],
        });
        let chain = Chain::from_blocks(vec![genesis, first, second]).unwrap();

        let report = audit_chain(&chain);
        assert_eq!(
            report.findings,
            vec![
                Finding::NumberingError {
                    block_number: u64::MAX,
                    expected: Some(1),
                },
                Finding::NumberingError {
                    block_number: u64::MAX,
                    expected: None,
                },
            ]
        );
        assert_eq!(report.blocks_checked, 3);
    }

    #[test]
    fn test_invalid_transaction_excluded_from_replayed_state() {
        let mut chain = Chain::genesis(Transaction::from_iter([("A", 100), ("B", 100)]));
        let block = Block::assemble(
            vec![
                Transaction::transfer("A", "B", 150),
                Transaction::from_iter([("A", -5), ("B", 3)]),
                Transaction::transfer("A", "B", 10),
            ],
            chain.tip(),
        )
        .unwrap();
        chain.append(block).unwrap();

        let report = audit_chain(&chain);
        let invalid: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.kind() == FindingKind::InvalidTransaction)
            .collect();
        assert_eq!(invalid.len(), 2);
        assert_eq!(report.state, LedgerState::from_iter([("A", 90), ("B", 110)]));
    }

    #[test]
    fn test_strict_mode_aborts_on_first_finding() {
        let chain = tamper(build_chain(), |blocks| {
            blocks[1].contents.parent_hash = "deadbeef".to_string();
            blocks[3].contents.block_number = 9;
        });

        let err = ChainAuditor::new(AuditMode::Strict)
            .audit(&chain)
            .unwrap_err();
        match err {
            ChainError::AuditAborted { finding } => {
                // The edit also breaks block 1's seal, which is checked first.
                assert_eq!(finding.block_number(), 1);
                assert_eq!(finding.kind(), FindingKind::HashMismatch);
            }
            other => panic!("Expected AuditAborted, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_passes_clean_chain() {
        let chain = build_chain();
        let strict = ChainAuditor::new(AuditMode::Strict).audit(&chain).unwrap();
        assert_eq!(strict, audit_chain(&chain));
    }

    #[test]
    fn test_collect_mode_matches_free_function() {
        let chain = tamper(build_chain(), |blocks| {
            blocks[3].contents.txn_count = 0;
        });
        let report = ChainAuditor::default().audit(&chain).unwrap();
        assert_eq!(report, audit_chain(&chain));
        assert_eq!(report.findings.len(), 2);
    }

    #[test]
    fn test_audit_mode_parses_from_lowercase() {
        let mode: AuditMode = serde_json::from_str(r#""strict""#).unwrap();
        assert_eq!(mode, AuditMode::Strict);
        assert_eq!(AuditMode::default(), AuditMode::Collect);
    }
}
