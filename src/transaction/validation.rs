/// Legality checks for transactions, separated from type definitions
use crate::blockchain::LedgerState;
use crate::transaction::types::{Account, Transaction};
use serde::Serialize;
use thiserror::Error;

/// Why a transaction cannot be applied to a state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum TxnRejection {
    #[error("deltas sum to {sum}, tokens must be conserved")]
    Conservation { sum: i128 },

    #[error("account {account} would be overdrawn: balance {balance}, delta {delta}")]
    Overdraft {
        account: Account,
        balance: i64,
        delta: i64,
    },

    #[error("balance of account {account} would overflow")]
    Overflow { account: Account },
}

impl Transaction {
    /// Check this transaction against `state` without modifying it.
    ///
    /// Every account is checked against the same pre-transaction snapshot.
    pub fn check(&self, state: &LedgerState) -> Result<(), TxnRejection> {
        let sum = self.sum();
        if sum != 0 {
            return Err(TxnRejection::Conservation { sum });
        }

        for (account, delta) in self.iter() {
            let balance = state.balance(account);
            match balance.checked_add(delta) {
                Some(after) if after < 0 => {
                    return Err(TxnRejection::Overdraft {
                        account: account.to_string(),
                        balance,
                        delta,
                    })
                }
                Some(_) => {}
                None => {
                    return Err(TxnRejection::Overflow {
                        account: account.to_string(),
                    })
                }
            }
        }

        Ok(())
    }

    pub fn is_valid(&self, state: &LedgerState) -> bool {
        self.check(state).is_ok()
    }
}

/// Free-function form of [`Transaction::is_valid`].
pub fn is_valid(txn: &Transaction, state: &LedgerState) -> bool {
    txn.is_valid(state)
}
