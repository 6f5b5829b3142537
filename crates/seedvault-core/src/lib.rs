//! SeedVault Core
//!
//! Password-encrypted storage of a BIP-39 recovery phrase and HD account
//! derivation for Solana and Ethereum.
//!
//! # Key Derivation
//!
//! From a single BIP-39 seed:
//! - Solana accounts via SLIP-0010 ed25519: `m/44'/501'/i'/0'`
//! - Ethereum accounts via BIP-32 secp256k1: `m/44'/60'/0'/0/i`
//!
//! # Encrypted Storage
//!
//! The phrase is encrypted at rest with Argon2id + AES-256-GCM. The vault
//! blob carries its own KDF parameters, salt, and nonce.

pub mod chain;
pub mod evm;
pub mod keys;
pub mod password;
pub mod phrase;
pub mod service;
pub mod session;
mod slip10;
pub mod store;
pub mod vault;

pub use chain::{Chain, DerivationPath};
pub use keys::{derive_account, derive_accounts, seed_from_phrase, Account, KeyDeriver, KeyError, Seed};
pub use password::{check_password, estimate_entropy, PasswordError, MIN_PASSWORD_LEN};
pub use phrase::{PhraseError, RecoveryPhrase, WordCount};
pub use service::ChainService;
pub use session::{change_password, create_vault, SessionError, WalletSession};
pub use store::{MemoryStore, StoreError, VaultStore};
pub use vault::{EncryptedVault, KdfParams, VaultCodec, VaultError};
