use crate::transaction::{Account, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account balances. A missing account has balance zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerState {
    balances: BTreeMap<Account, i64>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, account: &str) -> i64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<Account, i64> {
        &self.balances
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.balances.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances, widened so it cannot overflow.
    pub fn total_supply(&self) -> i128 {
        self.balances.values().map(|v| i128::from(*v)).sum()
    }

    /// Snapshot with `txn` folded in. `self` is left untouched.
    ///
    /// Performs no validation: callers gate with [`Transaction::check`].
    pub fn apply(&self, txn: &Transaction) -> LedgerState {
        let mut next = self.clone();
        next.apply_in_place(txn);
        next
    }

    /// Fold `txn` into this state. Unknown accounts are created.
    pub fn apply_in_place(&mut self, txn: &Transaction) {
        for (account, delta) in txn.iter() {
            let balance = self.balances.entry(account.to_string()).or_insert(0);
            *balance = balance.saturating_add(delta);
        }
    }
}

impl<K: Into<Account>> FromIterator<(K, i64)> for LedgerState {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let balances: BTreeMap<Account, i64> =
            iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self { balances }
    }
}

/// Free-function form of [`LedgerState::apply`].
pub fn apply(txn: &Transaction, state: &LedgerState) -> LedgerState {
    state.apply(txn)
}
