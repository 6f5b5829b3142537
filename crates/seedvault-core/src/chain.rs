//! Supported chains and their HD derivation paths
//!
//! - Solana: `m/44'/501'/<index>'/0'` (SLIP-0010, every level hardened)
//! - Ethereum: `m/44'/60'/0'/0/<index>` (BIP-44, address index unhardened)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// BIP-44 purpose
pub const PURPOSE: u32 = 44;

/// SLIP-44 coin types
pub mod coin_type {
    pub const ETHEREUM: u32 = 60;
    pub const SOLANA: u32 = 501;
}

/// Hardened offset for BIP-32 child numbers
pub const HARDENED: u32 = 0x8000_0000;

/// Largest account index either scheme accepts
pub const MAX_ACCOUNT_INDEX: u32 = HARDENED - 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown chain: {0}")]
pub struct UnknownChain(pub String);

/// Elliptic curve used by a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Ed25519,
    Secp256k1,
}

/// A chain the wallet can derive accounts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Solana,
    Ethereum,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Solana, Chain::Ethereum];

    pub const fn coin_type(self) -> u32 {
        match self {
            Chain::Solana => coin_type::SOLANA,
            Chain::Ethereum => coin_type::ETHEREUM,
        }
    }

    pub const fn curve(self) -> Curve {
        match self {
            Chain::Solana => Curve::Ed25519,
            Chain::Ethereum => Curve::Secp256k1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Chain::Solana => "solana",
            Chain::Ethereum => "ethereum",
        }
    }

    /// Derivation path for the account at `index`
    pub fn path(self, index: u32) -> DerivationPath {
        DerivationPath { chain: self, index }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chain {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solana" | "sol" => Ok(Chain::Solana),
            "ethereum" | "eth" | "evm" => Ok(Chain::Ethereum),
            _ => Err(UnknownChain(s.to_string())),
        }
    }
}

/// One step of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: u32,
    pub hardened: bool,
}

impl Segment {
    const fn hardened(index: u32) -> Self {
        Self {
            index,
            hardened: true,
        }
    }

    const fn normal(index: u32) -> Self {
        Self {
            index,
            hardened: false,
        }
    }
}

/// Chain + account index, rendered in the chain's path grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationPath {
    pub chain: Chain,
    pub index: u32,
}

impl DerivationPath {
    /// Path segments below the master key
    pub fn segments(&self) -> Vec<Segment> {
        match self.chain {
            Chain::Solana => vec![
                Segment::hardened(PURPOSE),
                Segment::hardened(coin_type::SOLANA),
                Segment::hardened(self.index),
                Segment::hardened(0),
            ],
            Chain::Ethereum => vec![
                Segment::hardened(PURPOSE),
                Segment::hardened(coin_type::ETHEREUM),
                Segment::hardened(0),
                Segment::normal(0),
                Segment::normal(self.index),
            ],
        }
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chain {
            Chain::Solana => write!(f, "m/44'/501'/{}'/0'", self.index),
            Chain::Ethereum => write!(f, "m/44'/60'/0'/0/{}", self.index),
        }
    }
}
