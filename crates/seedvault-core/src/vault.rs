//! Password-based vault encryption for recovery phrases
//!
//! Argon2id key derivation + AES-256-GCM. Every encryption draws a fresh salt
//! and nonce, so the same phrase under the same password never produces the
//! same blob twice.
//!
//! # Blob format
//!
//! ```text
//! [m_cost u32 LE][t_cost u32 LE][p_cost u32 LE][salt 16][nonce 12][ciphertext + tag]
//! ```
//!
//! The bytes travel as one standard base64 string. Decryption always uses
//! the embedded KDF parameters, not the codec's.
//!
//! # Failure policy
//!
//! [`VaultCodec::decrypt`] returns `None` for every failure: malformed blob,
//! wrong password, tampered bytes, or plaintext that is not a valid phrase.

use crate::phrase::RecoveryPhrase;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

/// Output length of the KDF (AES-256 key)
const KEY_LEN: usize = 32;

/// Salt length for Argon2
const SALT_LEN: usize = 16;

/// Nonce length for AES-256-GCM
const NONCE_LEN: usize = 12;

/// GCM authentication tag length
const TAG_LEN: usize = 16;

/// Three little-endian u32 KDF parameters
const HEADER_LEN: usize = 12;

const MIN_BLOB_LEN: usize = HEADER_LEN + SALT_LEN + NONCE_LEN + TAG_LEN + 1;

/// Upper bounds accepted from a blob
pub const MAX_M_COST_KIB: u32 = 1024 * 1024;
pub const MAX_T_COST: u32 = 64;
pub const MAX_P_COST: u32 = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Invalid KDF parameters: {0}")]
    InvalidParams(String),
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("Invalid vault format")]
    InvalidFormat,
    #[error("Invalid password or corrupted vault")]
    Rejected,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub m_cost_kib: u32,
    /// Number of passes
    pub t_cost: u32,
    /// Lanes
    pub p_cost: u32,
}

impl Default for KdfParams {
    /// 19 MiB, 2 passes, 1 lane (OWASP's lightest Argon2id profile)
    fn default() -> Self {
        Self {
            m_cost_kib: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    pub fn new(m_cost_kib: u32, t_cost: u32, p_cost: u32) -> Result<Self, VaultError> {
        let params = Self {
            m_cost_kib,
            t_cost,
            p_cost,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the parameters against Argon2's minimums and our ceilings
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.p_cost == 0 || self.p_cost > MAX_P_COST {
            return Err(VaultError::InvalidParams(format!(
                "p_cost {} outside 1..={}",
                self.p_cost, MAX_P_COST
            )));
        }
        if self.t_cost == 0 || self.t_cost > MAX_T_COST {
            return Err(VaultError::InvalidParams(format!(
                "t_cost {} outside 1..={}",
                self.t_cost, MAX_T_COST
            )));
        }
        let min_m = 8 * self.p_cost;
        if self.m_cost_kib < min_m || self.m_cost_kib > MAX_M_COST_KIB {
            return Err(VaultError::InvalidParams(format!(
                "m_cost {} KiB outside {}..={}",
                self.m_cost_kib, min_m, MAX_M_COST_KIB
            )));
        }
        Ok(())
    }

    fn to_argon2(self) -> Result<Argon2<'static>, VaultError> {
        let params = Params::new(self.m_cost_kib, self.t_cost, self.p_cost, Some(KEY_LEN))
            .map_err(|e| VaultError::KeyDerivationFailed(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// An encrypted recovery phrase, ready for storage
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedVault {
    params: KdfParams,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    /// Encrypted phrase + authentication tag
    ciphertext: Vec<u8>,
}

impl fmt::Debug for EncryptedVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedVault")
            .field("params", &self.params)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

impl EncryptedVault {
    pub fn params(&self) -> KdfParams {
        self.params
    }

    /// Serialize to bytes: header || salt || nonce || ciphertext
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(HEADER_LEN + SALT_LEN + NONCE_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.params.m_cost_kib.to_le_bytes());
        bytes.extend_from_slice(&self.params.t_cost.to_le_bytes());
        bytes.extend_from_slice(&self.params.p_cost.to_le_bytes());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Deserialize from bytes, rejecting out-of-bounds KDF parameters
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VaultError> {
        if bytes.len() < MIN_BLOB_LEN {
            return Err(VaultError::InvalidFormat);
        }

        let (header, rest) = bytes.split_at(HEADER_LEN);
        let params = KdfParams {
            m_cost_kib: read_u32(&header[0..4]),
            t_cost: read_u32(&header[4..8]),
            p_cost: read_u32(&header[8..12]),
        };
        params.validate().map_err(|_| VaultError::InvalidFormat)?;

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        salt.copy_from_slice(&rest[..SALT_LEN]);
        nonce.copy_from_slice(&rest[SALT_LEN..SALT_LEN + NONCE_LEN]);
        let ciphertext = rest[SALT_LEN + NONCE_LEN..].to_vec();

        Ok(Self {
            params,
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Parse the base64 text form
    pub fn parse(text: &str) -> Result<Self, VaultError> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|_| VaultError::InvalidFormat)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for EncryptedVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(self.to_bytes()))
    }
}

impl FromStr for EncryptedVault {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

/// Derive an encryption key from a password using Argon2id
fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    params: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let argon2 = params.to_argon2()?;
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| VaultError::KeyDerivationFailed(e.to_string()))?;
    Ok(key)
}

/// Encrypts and decrypts recovery phrases under a password.
///
/// Holds only the KDF parameters used for *new* vaults; decryption always
/// uses the parameters embedded in the blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaultCodec {
    params: KdfParams,
}

impl VaultCodec {
    pub fn new(params: KdfParams) -> Result<Self, VaultError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> KdfParams {
        self.params
    }

    /// Encrypt a phrase with a password.
    ///
    /// The canonical phrase text (lowercase, single spaces) is what gets
    /// encrypted. Enforcing a minimum password length is the caller's job;
    /// this only refuses an empty password.
    pub fn encrypt(
        &self,
        phrase: &RecoveryPhrase,
        password: &str,
    ) -> Result<EncryptedVault, VaultError> {
        if password.is_empty() {
            return Err(VaultError::EmptyPassword);
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let nonce_arr = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&nonce_arr);

        let key = derive_key(password, &salt, self.params)?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), phrase.as_str().as_bytes())
            .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;

        log::debug!(
            "Encrypted {}-word phrase (m_cost={} KiB, t_cost={}, p_cost={})",
            phrase.word_count().words(),
            self.params.m_cost_kib,
            self.params.t_cost,
            self.params.p_cost
        );

        Ok(EncryptedVault {
            params: self.params,
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt a vault. Returns `None` on any failure.
    pub fn decrypt(&self, vault: &EncryptedVault, password: &str) -> Option<RecoveryPhrase> {
        let phrase = open(vault, password);
        if phrase.is_none() {
            log::debug!("Vault decryption rejected");
        }
        phrase
    }

    /// Parse a stored blob and decrypt it. Returns `None` on any failure.
    pub fn decrypt_blob(&self, blob: &str, password: &str) -> Option<RecoveryPhrase> {
        match EncryptedVault::parse(blob) {
            Ok(vault) => self.decrypt(&vault, password),
            Err(_) => {
                log::debug!("Vault decryption rejected");
                None
            }
        }
    }

    /// Re-encrypt a vault under a new password with fresh salt and nonce,
    /// using this codec's parameters.
    pub fn reencrypt(
        &self,
        vault: &EncryptedVault,
        old_password: &str,
        new_password: &str,
    ) -> Result<EncryptedVault, VaultError> {
        let phrase = self
            .decrypt(vault, old_password)
            .ok_or(VaultError::Rejected)?;
        self.encrypt(&phrase, new_password)
    }
}

fn open(vault: &EncryptedVault, password: &str) -> Option<RecoveryPhrase> {
    let key = derive_key(password, &vault.salt, vault.params).ok()?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&vault.nonce), vault.ciphertext.as_slice())
            .ok()?,
    );

    let text = std::str::from_utf8(&plaintext).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    RecoveryPhrase::parse(text).ok()
}
