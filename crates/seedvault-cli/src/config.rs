//! CLI configuration: parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use seedvault_core::{Chain, KdfParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub storage: StorageSection,

    /// Argon2id cost for newly written vaults
    #[serde(default)]
    pub kdf: KdfParams,

    #[serde(default)]
    pub wallet: WalletSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSection {
    /// Default chain: "solana" or "ethereum"
    #[serde(default = "default_chain")]
    pub chain: String,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            log_level: default_log_level(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("seedvault.db")
}

fn default_chain() -> String {
    "solana".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl WalletConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: WalletConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// File (if given) + env overrides + validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config
            .validate()
            .context("Configuration validation failed")?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `SEEDVAULT_DB_PATH`
    /// - `SEEDVAULT_CHAIN`
    /// - `SEEDVAULT_LOG_LEVEL`
    /// - `SEEDVAULT_KDF_M_COST`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SEEDVAULT_DB_PATH") {
            self.storage.db_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SEEDVAULT_CHAIN") {
            self.wallet.chain = v;
        }
        if let Ok(v) = std::env::var("SEEDVAULT_LOG_LEVEL") {
            self.wallet.log_level = v;
        }
        if let Ok(v) = std::env::var("SEEDVAULT_KDF_M_COST") {
            if let Ok(kib) = v.parse::<u32>() {
                self.kdf.m_cost_kib = kib;
            }
        }
    }

    pub fn chain(&self) -> Result<Chain> {
        self.wallet
            .chain
            .parse()
            .with_context(|| format!("wallet.chain '{}' is not supported", self.wallet.chain))
    }

    pub fn validate(&self) -> Result<()> {
        self.kdf
            .validate()
            .context("kdf parameters out of range")?;
        self.chain()?;
        anyhow::ensure!(
            !self.storage.db_path.as_os_str().is_empty(),
            "storage.db_path must not be empty"
        );
        Ok(())
    }
}
