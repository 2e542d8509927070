// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// chain structure, ledger state and block verification.

pub mod core;
pub use core::*;
