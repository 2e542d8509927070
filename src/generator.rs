//! Random two-party transfers for demos and load tests
//!
//! Every generated transaction conserves tokens by construction. Nothing here
//! checks balances, so a generated transfer may still overdraw its payer.

use crate::transaction::{Account, Transaction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct TxnGenerator {
    rng: StdRng,
    payer: Account,
    payee: Account,
    max_value: i64,
}

impl TxnGenerator {
    /// Generator seeded once; a given seed always yields the same sequence.
    pub fn seeded(seed: u64, payer: &str, payee: &str, max_value: i64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            payer: payer.to_string(),
            payee: payee.to_string(),
            max_value: max_value.max(1),
        }
    }

    /// Generator seeded from the OS.
    pub fn from_entropy(payer: &str, payee: &str, max_value: i64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            payer: payer.to_string(),
            payee: payee.to_string(),
            max_value: max_value.max(1),
        }
    }

    /// One transfer of `1..=max_value` tokens in a random direction.
    pub fn next_txn(&mut self) -> Transaction {
        let sign: i64 = if self.rng.gen::<bool>() { 1 } else { -1 };
        let amount = self.rng.gen_range(1..=self.max_value);
        let payer_delta = sign * amount;
        Transaction::from_iter([
            (self.payer.clone(), payer_delta),
            (self.payee.clone(), -payer_delta),
        ])
    }

    pub fn take_batch(&mut self, n: usize) -> Vec<Transaction> {
        (0..n).map(|_| self.next_txn()).collect()
    }
}

impl Iterator for TxnGenerator {
    type Item = Transaction;

    fn next(&mut self) -> Option<Transaction> {
        Some(self.next_txn())
    }
}
