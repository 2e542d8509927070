//! Hash commitments for HashLedger
//!
//! A commitment is the lowercase hex SHA-256 digest of a value's canonical
//! byte form. The canonical form is compact JSON: struct fields in declaration
//! order and map keys in sorted order, so block assembly and verification
//! always arrive at the same string for the same logical contents.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io;

/// Length of a commitment string (32 digest bytes, hex encoded).
pub const COMMITMENT_LEN: usize = 64;

/// Lets `serde_json` stream the canonical form straight into the hasher.
struct DigestWriter<'a>(&'a mut Sha256);

impl io::Write for DigestWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Types whose commitment is taken over their own canonical serialization.
pub trait HashCommitment: Serialize {
    fn commitment(&self) -> String {
        hash_commitment(self)
    }
}

/// Compute the commitment of any serializable value.
///
/// Only ledger records (string keys, integers, sequences) are committed, and
/// those always serialize; a failure here means a non-serializable shape was
/// introduced into a record type.
pub fn hash_commitment<T: Serialize + ?Sized>(value: &T) -> String {
    let mut hasher = Sha256::new();
    serde_json::to_writer(DigestWriter(&mut hasher), value)
        .expect("ledger records serialize to JSON");
    hex::encode(hasher.finalize())
}

/// Whether `s` has the shape of a commitment (64 lowercase hex chars).
pub fn is_commitment(s: &str) -> bool {
    s.len() == COMMITMENT_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_commitment_is_deterministic() {
        let mut value = BTreeMap::new();
        value.insert("Bob".to_string(), 3i64);
        value.insert("Alice".to_string(), -3i64);

        let first = hash_commitment(&value);
        let second = hash_commitment(&value);
        assert_eq!(first, second);
        assert!(is_commitment(&first));
    }

    #[test]
    fn test_commitment_matches_sha256_of_compact_json() {
        let mut value = BTreeMap::new();
        value.insert("Alice".to_string(), 50i64);

        let expected = hex::encode(Sha256::digest(br#"{"Alice":50}"#));
        assert_eq!(hash_commitment(&value), expected);
    }

    #[test]
    fn test_insertion_order_does_not_change_commitment() {
        let mut a = BTreeMap::new();
        a.insert("Alice".to_string(), 1i64);
        a.insert("Bob".to_string(), -1i64);

        let mut b = BTreeMap::new();
        b.insert("Bob".to_string(), -1i64);
        b.insert("Alice".to_string(), 1i64);

        assert_eq!(hash_commitment(&a), hash_commitment(&b));
    }

    #[test]
    fn test_different_values_commit_differently() {
        let mut a = BTreeMap::new();
        a.insert("Alice".to_string(), 1i64);
        let mut b = BTreeMap::new();
        b.insert("Alice".to_string(), 2i64);

        assert_ne!(hash_commitment(&a), hash_commitment(&b));
    }

    #[test]
    fn test_is_commitment_rejects_bad_shapes() {
        assert!(!is_commitment(""));
        assert!(!is_commitment(&"A".repeat(COMMITMENT_LEN)));
        assert!(!is_commitment(&"0".repeat(COMMITMENT_LEN - 1)));
        assert!(is_commitment(&"0".repeat(COMMITMENT_LEN)));
    }
}
