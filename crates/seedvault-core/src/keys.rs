//! Account derivation from a BIP-39 seed
//!
//! Two HD schemes hang off the same 64-byte seed:
//! - Solana: SLIP-0010 ed25519 along `m/44'/501'/i'/0'`
//! - Ethereum: BIP-32 secp256k1 along `m/44'/60'/0'/0/i`
//!
//! Accounts are never persisted; they are re-derived on every unlock.

use crate::chain::{Chain, Curve, DerivationPath, Segment, MAX_ACCOUNT_INDEX};
use crate::evm;
use crate::phrase::RecoveryPhrase;
use crate::slip10;
use bitcoin::bip32::{ChildNumber, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::Network;
use ed25519_dalek::SigningKey;
use std::fmt;
use thiserror::Error;
use zeroize::{ZeroizeOnDrop, Zeroizing};

/// BIP-39 seed length in bytes
pub const SEED_LEN: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid seed length: {0} bytes (expected 64)")]
    InvalidSeedLength(usize),
    #[error("Account index {0} out of range")]
    IndexOutOfRange(u32),
    #[error("Derivation failed: {0}")]
    DerivationFailed(String),
}

/// 64-byte BIP-39 seed, wiped on drop
#[derive(Clone)]
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl ZeroizeOnDrop for Seed {}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// Stretch a phrase into its seed (PBKDF2-HMAC-SHA512, 2048 rounds,
/// salt `"mnemonic" + passphrase`)
pub fn seed_from_phrase(phrase: &RecoveryPhrase, passphrase: &str) -> Seed {
    Seed(phrase.to_seed_bytes(passphrase))
}

/// One derived account.
///
/// The private key string is the chain's export format: base58 of the
/// 64-byte keypair for Solana, `0x`-prefixed hex for Ethereum.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub chain: Chain,
    pub index: u32,
    pub path: DerivationPath,
    pub address: String,
    pub public_key: String,
    private_key: Zeroizing<String>,
}

impl Account {
    /// Exported private key. Handle with care.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl ZeroizeOnDrop for Account {}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("chain", &self.chain)
            .field("index", &self.index)
            .field("path", &self.path.to_string())
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// HD scheme for a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDeriver {
    /// SLIP-0010, hardened-only
    Ed25519Hd,
    /// BIP-32
    Secp256k1Hd,
}

impl KeyDeriver {
    pub fn for_chain(chain: Chain) -> Self {
        match chain.curve() {
            Curve::Ed25519 => KeyDeriver::Ed25519Hd,
            Curve::Secp256k1 => KeyDeriver::Secp256k1Hd,
        }
    }

    /// Walk `path` from the seed and return the 32-byte private key
    pub fn derive_secret(
        &self,
        seed: &[u8],
        path: &DerivationPath,
    ) -> Result<Zeroizing<[u8; 32]>, KeyError> {
        check_seed(seed)?;
        let segments = path.segments();
        match self {
            KeyDeriver::Ed25519Hd => {
                if let Some(soft) = segments.iter().find(|s| !s.hardened) {
                    return Err(KeyError::DerivationFailed(format!(
                        "ed25519 requires hardened segments, got {} in {}",
                        soft.index, path
                    )));
                }
                let indices: Vec<u32> = segments.iter().map(|s| s.index).collect();
                slip10::derive(seed, &indices)
            }
            KeyDeriver::Secp256k1Hd => {
                let secp = Secp256k1::new();
                let master = Xpriv::new_master(Network::Bitcoin, seed)
                    .map_err(|e| KeyError::DerivationFailed(e.to_string()))?;
                let children = segments
                    .iter()
                    .map(to_child_number)
                    .collect::<Result<Vec<_>, _>>()?;
                let derived = master
                    .derive_priv(&secp, &children)
                    .map_err(|e| KeyError::DerivationFailed(e.to_string()))?;
                Ok(Zeroizing::new(derived.private_key.secret_bytes()))
            }
        }
    }

    /// Derive the account at `index` on `chain`.
    ///
    /// Fails when `chain` uses a different curve than this deriver.
    pub fn derive_account(
        &self,
        seed: &[u8],
        chain: Chain,
        index: u32,
    ) -> Result<Account, KeyError> {
        if KeyDeriver::for_chain(chain) != *self {
            return Err(KeyError::DerivationFailed(format!(
                "{:?} cannot derive {} accounts",
                self, chain
            )));
        }
        if index > MAX_ACCOUNT_INDEX {
            return Err(KeyError::IndexOutOfRange(index));
        }
        let path = chain.path(index);
        let secret = self.derive_secret(seed, &path)?;

        let (address, public_key, private_key) = match chain {
            Chain::Solana => solana_encoding(&secret),
            Chain::Ethereum => ethereum_encoding(&secret)?,
        };

        Ok(Account {
            chain,
            index,
            path,
            address,
            public_key,
            private_key,
        })
    }
}

/// Derive the account at `index` on `chain` with the chain's own scheme
pub fn derive_account(seed: &[u8], chain: Chain, index: u32) -> Result<Account, KeyError> {
    KeyDeriver::for_chain(chain).derive_account(seed, chain, index)
}

/// Derive accounts `0..count` in index order
pub fn derive_accounts(seed: &[u8], chain: Chain, count: u32) -> Result<Vec<Account>, KeyError> {
    if count > MAX_ACCOUNT_INDEX + 1 {
        return Err(KeyError::IndexOutOfRange(count - 1));
    }
    check_seed(seed)?;
    let deriver = KeyDeriver::for_chain(chain);
    (0..count)
        .map(|index| deriver.derive_account(seed, chain, index))
        .collect()
}

fn check_seed(seed: &[u8]) -> Result<(), KeyError> {
    if seed.len() != SEED_LEN {
        return Err(KeyError::InvalidSeedLength(seed.len()));
    }
    Ok(())
}

fn to_child_number(segment: &Segment) -> Result<ChildNumber, KeyError> {
    let child = if segment.hardened {
        ChildNumber::from_hardened_idx(segment.index)
    } else {
        ChildNumber::from_normal_idx(segment.index)
    };
    child.map_err(|_| KeyError::IndexOutOfRange(segment.index))
}

fn solana_encoding(secret: &[u8; 32]) -> (String, String, Zeroizing<String>) {
    let signing_key = SigningKey::from_bytes(secret);
    let public = bs58::encode(signing_key.verifying_key().to_bytes()).into_string();
    let keypair = Zeroizing::new(signing_key.to_keypair_bytes());
    let private_key = Zeroizing::new(bs58::encode(&keypair[..]).into_string());
    (public.clone(), public, private_key)
}

fn ethereum_encoding(secret: &[u8; 32]) -> Result<(String, String, Zeroizing<String>), KeyError> {
    let secp = Secp256k1::new();
    let secret_key = bitcoin::secp256k1::SecretKey::from_slice(secret)
        .map_err(|e| KeyError::DerivationFailed(e.to_string()))?;
    let public = secret_key.public_key(&secp);

    let address = evm::address(&public);
    let public_key = format!("0x{}", hex::encode(public.serialize()));
    let private_key = Zeroizing::new(format!("0x{}", hex::encode(secret)));
    Ok((address, public_key, private_key))
}
