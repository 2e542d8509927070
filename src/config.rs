//! Configuration management for HashLedger

use crate::audit::AuditMode;
use crate::error::ChainError;
use crate::transaction::{Account, Transaction};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Default config file looked up by the binaries.
pub const DEFAULT_CONFIG_PATH: &str = "hashledger.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub genesis: GenesisConfig,
    #[serde(default)]
    pub producer: ProducerConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenesisConfig {
    #[serde(default = "default_balances")]
    pub balances: BTreeMap<Account, i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    #[serde(default = "default_block_size_limit")]
    pub block_size_limit: usize,
    #[serde(default = "default_txn_count")]
    pub txn_count: usize,
    #[serde(default = "default_max_value")]
    pub max_value: i64,
    #[serde(default)]
    pub seed: u64,
    /// Defaults to the first genesis account.
    #[serde(default)]
    pub payer: Option<Account>,
    /// Defaults to the second genesis account.
    #[serde(default)]
    pub payee: Option<Account>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub mode: AuditMode,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            balances: default_balances(),
        }
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            block_size_limit: default_block_size_limit(),
            txn_count: default_txn_count(),
            max_value: default_max_value(),
            seed: 0,
            payer: None,
            payee: None,
        }
    }
}

impl Config {
    /// The genesis allocation as a transaction.
    pub fn genesis_allocation(&self) -> Transaction {
        Transaction::new(self.genesis.balances.clone())
    }

    /// The two generator accounts, falling back to the genesis accounts.
    pub fn parties(&self) -> Result<(Account, Account), ChainError> {
        let mut accounts = self.genesis.balances.keys();
        let payer = self
            .producer
            .payer
            .clone()
            .or_else(|| accounts.next().cloned());
        let payee = self
            .producer
            .payee
            .clone()
            .or_else(|| accounts.find(|a| Some(*a) != payer.as_ref()).cloned());

        match (payer, payee) {
            (Some(payer), Some(payee)) if payer != payee => Ok((payer, payee)),
            (Some(_), Some(_)) => Err(ChainError::Config(
                "producer.payer and producer.payee must differ".to_string(),
            )),
            _ => Err(ChainError::Config(
                "two accounts are needed to generate transfers".to_string(),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if self.genesis.balances.is_empty() {
            return Err(ChainError::Config(
                "genesis.balances must name at least one account".to_string(),
            ));
        }

        if let Some((account, balance)) = self.genesis.balances.iter().find(|(_, b)| **b < 0) {
            return Err(ChainError::Config(format!(
                "genesis balance of {} is negative ({})",
                account, balance
            )));
        }

        if self.producer.block_size_limit == 0 {
            return Err(ChainError::Config(
                "producer.block_size_limit must be at least 1".to_string(),
            ));
        }

        if self.producer.max_value <= 0 {
            return Err(ChainError::Config(
                "producer.max_value must be positive".to_string(),
            ));
        }

        self.parties()?;
        Ok(())
    }
}

/// Parse and validate a config from TOML text.
pub fn parse_config(text: &str) -> Result<Config, ChainError> {
    let config: Config = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, falling back to defaults when it does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    match fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

fn default_balances() -> BTreeMap<Account, i64> {
    BTreeMap::from([("Alice".to_string(), 50), ("Bob".to_string(), 50)])
}

fn default_block_size_limit() -> usize {
    5
}

fn default_txn_count() -> usize {
    30
}

fn default_max_value() -> i64 {
    3
}
