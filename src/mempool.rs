//! Pending transaction pool
//!
//! Transactions are drained newest-first: `pop` takes the most recently
//! pushed transaction.

use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    pending: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, txn: Transaction) {
        self.pending.push(txn);
    }

    pub fn pop(&mut self) -> Option<Transaction> {
        self.pending.pop()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FromIterator<Transaction> for Mempool {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            pending: iter.into_iter().collect(),
        }
    }
}

impl Extend<Transaction> for Mempool {
    fn extend<I: IntoIterator<Item = Transaction>>(&mut self, iter: I) {
        self.pending.extend(iter);
    }
}
