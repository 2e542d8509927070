use crate::crypto::{hash_commitment, HashCommitment};
use crate::error::ChainError;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hex-encoded SHA-256 commitment of a block's contents.
pub type BlockHash = String;

/// The hashed part of a block. Field order is the canonical key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockContents {
    pub block_number: u64,
    /// Empty for the genesis block.
    pub parent_hash: BlockHash,
    pub txn_count: u64,
    pub txns: Vec<Transaction>,
}

impl HashCommitment for BlockContents {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: BlockHash,
    pub contents: BlockContents,
}

impl Block {
    /// Seal `contents` by committing to them.
    pub fn new(contents: BlockContents) -> Self {
        let hash = hash_commitment(&contents);
        Block { hash, contents }
    }

    /// Genesis block carrying the initial allocation as its sole transaction.
    pub fn genesis(allocation: Transaction) -> Self {
        Block::new(BlockContents {
            block_number: 0,
            parent_hash: String::new(),
            txn_count: 1,
            txns: vec![allocation],
        })
    }

    /// Build the block that extends `parent` with `accepted` transactions.
    ///
    /// The transactions are not re-validated here; the producer gates them
    /// and the auditor re-checks them on replay. Nothing is appended. Fails
    /// only when `parent` already carries the largest possible number.
    pub fn assemble(accepted: Vec<Transaction>, parent: &Block) -> Result<Self, ChainError> {
        let block_number = parent.next_number()?;
        Ok(Block::new(BlockContents {
            block_number,
            parent_hash: parent.hash.clone(),
            txn_count: accepted.len() as u64,
            txns: accepted,
        }))
    }

    pub fn number(&self) -> u64 {
        self.contents.block_number
    }

    /// Number of the block that would follow this one.
    pub fn next_number(&self) -> Result<u64, ChainError> {
        self.number().checked_add(1).ok_or_else(|| {
            ChainError::InvalidBlock(format!(
                "Block {} has no successor number.",
                self.number()
            ))
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.contents.txns
    }

    /// Whether the stored hash matches a fresh commitment of the contents.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.contents.commitment()
    }
}

/// Free-function form of [`Block::assemble`].
pub fn assemble(accepted: Vec<Transaction>, parent: &Block) -> Result<Block, ChainError> {
    Block::assemble(accepted, parent)
}

/// Append-only sequence of blocks; index 0 is the genesis block.
///
/// Never empty. Blocks are only reachable by shared reference, so an appended
/// block cannot change while it is part of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Block>", into = "Vec<Block>")]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Start a chain from the initial account allocation.
    pub fn genesis(allocation: Transaction) -> Self {
        Chain {
            blocks: vec![Block::genesis(allocation)],
        }
    }

    /// Take a chain as-is, e.g. one received from elsewhere for auditing.
    /// Only the non-empty shape is enforced; contents are the auditor's job.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ChainError> {
        if blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        Ok(Chain { blocks })
    }

    /// Append a block that extends the current tip.
    ///
    /// The block must carry the next number, link to the tip's hash and
    /// commit to its own contents; otherwise the chain is left unchanged.
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let tip = self.tip();
        let expected = tip.next_number()?;

        if block.number() != expected {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid block number. Expected {}, but got {}.",
                expected,
                block.number()
            )));
        }

        if block.contents.parent_hash != tip.hash {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid parent hash. Expected {}, but got {}.",
                tip.hash, block.contents.parent_hash
            )));
        }

        if !block.has_valid_hash() {
            return Err(ChainError::InvalidBlock(format!(
                "Block {} hash does not match its contents.",
                block.number()
            )));
        }

        debug!(
            block_number = block.number(),
            txns = block.contents.txns.len(),
            "appended block"
        );
        self.blocks.push(block);
        Ok(())
    }

    pub fn tip(&self) -> &Block {
        // Non-empty by construction.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn genesis_block(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl TryFrom<Vec<Block>> for Chain {
    type Error = ChainError;

    fn try_from(blocks: Vec<Block>) -> Result<Self, Self::Error> {
        Chain::from_blocks(blocks)
    }
}

impl From<Chain> for Vec<Block> {
    fn from(chain: Chain) -> Self {
        chain.blocks
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::is_commitment;

    fn allocation() -> Transaction {
        Transaction::from_iter([("A", 100), ("B", 100)])
    }

    #[test]
    fn test_genesis_block_shape() {
        let chain = Chain::genesis(allocation());
        let genesis = chain.genesis_block();

        assert_eq!(chain.len(), 1);
        assert_eq!(genesis.number(), 0);
        assert_eq!(genesis.contents.parent_hash, "");
        assert_eq!(genesis.contents.txn_count, 1);
        assert!(genesis.has_valid_hash());
        assert!(is_commitment(&genesis.hash));
    }

    #[test]
    fn test_assemble_links_to_parent() {
        let chain = Chain::genesis(allocation());
        let txns = vec![
            Transaction::transfer("A", "B", 10),
            Transaction::transfer("B", "A", 3),
        ];

        let block = assemble(txns.clone(), chain.tip()).unwrap();
        assert_eq!(block.number(), 1);
        assert_eq!(block.contents.parent_hash, chain.tip().hash);
        assert_eq!(block.contents.txn_count, 2);
        assert_eq!(block.transactions(), txns.as_slice());
        assert_eq!(block.hash, block.contents.commitment());
        // Assembling does not touch the chain.
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_assemble_accepts_empty_batch() {
        let chain = Chain::genesis(allocation());
        let block = Block::assemble(Vec::new(), chain.tip()).unwrap();
        assert_eq!(block.contents.txn_count, 0);
        assert!(block.has_valid_hash());
    }

    #[test]
    fn test_contents_serialize_in_canonical_key_order() {
        let block = Block::genesis(Transaction::from_iter([("A", 1)]));
        let json = serde_json::to_string(&block.contents).unwrap();
        assert_eq!(
            json,
            r#"{"blockNumber":0,"parentHash":"","txnCount":1,"txns":[{"A":1}]}"#
        );
    }

    #[test]
    fn test_append_extends_tip() {
        let mut chain = Chain::genesis(allocation());
        let first = Block::assemble(vec![Transaction::transfer("A", "B", 1)], chain.tip()).unwrap();
        chain.append(first.clone()).unwrap();
        let second = Block::assemble(vec![], chain.tip()).unwrap();
        chain.append(second).unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.blocks()[1], first);
        assert_eq!(chain.tip().number(), 2);
    }

    #[test]
    fn test_append_rejects_stale_parent() {
        let mut chain = Chain::genesis(allocation());
        let stale = Block::assemble(vec![], chain.tip()).unwrap();
        let next = Block::assemble(vec![], chain.tip()).unwrap();
        chain.append(next).unwrap();

        let err = chain.append(stale).unwrap_err();
        assert!(matches!(err, ChainError::InvalidBlock(_)));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_append_rejects_wrong_parent_hash() {
        let mut chain = Chain::genesis(allocation());
        let mut block = Block::assemble(vec![], chain.tip()).unwrap();
        block.contents.parent_hash = "f".repeat(64);
        let block = Block::new(block.contents);

        assert!(chain.append(block).is_err());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_append_rejects_tampered_contents() {
        let mut chain = Chain::genesis(allocation());
        let mut block =
            Block::assemble(vec![Transaction::transfer("A", "B", 1)], chain.tip()).unwrap();
        block.contents.txns[0] = Transaction::transfer("A", "B", 99);

        let err = chain.append(block).unwrap_err();
        assert!(err.to_string().contains("hash does not match"));
    }

    fn block_at_max_number(parent: &Block) -> Block {
        Block::new(BlockContents {
            block_number: u64::MAX,
            parent_hash: parent.hash.clone(),
            txn_count: 0,
            txns: vec![],
        })
    }

    #[test]
    fn test_assemble_fails_after_max_number() {
        let genesis = Block::genesis(allocation());
        let last = block_at_max_number(&genesis);

        let err = Block::assemble(vec![], &last).unwrap_err();
        assert!(matches!(err, ChainError::InvalidBlock(_)));
    }

    #[test]
    fn test_append_fails_when_tip_has_max_number() {
        let genesis = Block::genesis(allocation());
        let last = block_at_max_number(&genesis);
        let mut chain = Chain::from_blocks(vec![genesis, last.clone()]).unwrap();

        let mut follower = Block::new(BlockContents {
            block_number: 0,
            parent_hash: last.hash.clone(),
            txn_count: 0,
            txns: vec![],
        });
        let err = chain.append(follower.clone()).unwrap_err();
        assert!(err.to_string().contains("no successor"));

        follower = block_at_max_number(&last);
        assert!(chain.append(follower).is_err());
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        assert!(matches!(
            Chain::from_blocks(Vec::new()),
            Err(ChainError::EmptyChain)
        ));
        assert!(serde_json::from_str::<Chain>("[]").is_err());
    }

    #[test]
    fn test_serialized_chain_keeps_hashes() {
        let mut chain = Chain::genesis(allocation());
        let block = Block::assemble(vec![Transaction::transfer("A", "B", 5)], chain.tip()).unwrap();
        chain.append(block).unwrap();

        let json = serde_json::to_string(&chain).unwrap();
        let loaded: Chain = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, chain);
        assert!(loaded.iter().all(Block::has_valid_hash));
    }
}
