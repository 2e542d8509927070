/// Transaction types for HashLedger
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a balance holder.
pub type Account = String;

/// A balance transfer: account -> signed delta (withdrawals negative,
/// deposits positive).
///
/// Accounts are kept sorted so iteration and serialization order never depend
/// on how the transaction was built. There is no mutable access once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction {
    deltas: BTreeMap<Account, i64>,
}

impl Transaction {
    pub fn new(deltas: BTreeMap<Account, i64>) -> Self {
        Self { deltas }
    }

    /// Two-party transfer of `amount` from `payer` to `payee`.
    pub fn transfer(payer: &str, payee: &str, amount: i64) -> Self {
        Self::from_iter([(payer, -amount), (payee, amount)])
    }

    pub fn deltas(&self) -> &BTreeMap<Account, i64> {
        &self.deltas
    }

    /// Delta for `account`, if the transaction touches it.
    pub fn delta(&self, account: &str) -> Option<i64> {
        self.deltas.get(account).copied()
    }

    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.deltas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.deltas.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all deltas, widened so it cannot overflow.
    pub fn sum(&self) -> i128 {
        self.deltas.values().map(|v| i128::from(*v)).sum()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

impl<K: Into<Account>> FromIterator<(K, i64)> for Transaction {
    /// Repeated accounts are merged by adding their deltas.
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut deltas: BTreeMap<Account, i64> = BTreeMap::new();
        for (account, delta) in iter {
            let entry = deltas.entry(account.into()).or_insert(0);
            *entry = entry.saturating_add(delta);
        }
        Self { deltas }
    }
}

impl From<BTreeMap<Account, i64>> for Transaction {
    fn from(deltas: BTreeMap<Account, i64>) -> Self {
        Self::new(deltas)
    }
}
