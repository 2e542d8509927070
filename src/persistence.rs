//! Chain snapshots for HashLedger
//!
//! A snapshot is the JSON list of blocks exactly as they were hashed, so a
//! loaded chain commits to the same hashes it was saved with. Loading does not
//! verify anything beyond the chain being non-empty; run the auditor on it.

use crate::blockchain::Chain;
use crate::error::ChainError;
use std::fs;
use std::path::Path;

pub fn save_chain(path: impl AsRef<Path>, chain: &Chain) -> Result<(), ChainError> {
    let json = serde_json::to_string_pretty(chain)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_chain(path: impl AsRef<Path>) -> Result<Chain, ChainError> {
    let json = fs::read_to_string(path)?;
    let chain = serde_json::from_str(&json)?;
    Ok(chain)
}
