//! SLIP-0010 ed25519 derivation
//!
//! Only hardened children exist for ed25519; every index is OR-ed with
//! `0x8000_0000` before it is hashed.

use crate::chain::HARDENED;
use crate::keys::KeyError;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

const MASTER_SECRET: &[u8] = b"ed25519 seed";

/// Private key and chain code at one node of the tree
pub(crate) struct ExtendedKey {
    pub key: Zeroizing<[u8; 32]>,
    pub chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    /// `I = HMAC-SHA512("ed25519 seed", seed)`
    pub fn master(seed: &[u8]) -> Result<Self, KeyError> {
        Ok(split(hmac_sha512(MASTER_SECRET, &[seed])?))
    }

    /// `I = HMAC-SHA512(chain_code, 0x00 || key || ser32(index | 2^31))`
    pub fn child(&self, index: u32) -> Result<Self, KeyError> {
        let hardened = (index | HARDENED).to_be_bytes();
        Ok(split(hmac_sha512(
            &self.chain_code[..],
            &[&[0x00], &self.key[..], &hardened],
        )?))
    }
}

/// Walk `indices` from the master node and return the leaf private key
pub(crate) fn derive(seed: &[u8], indices: &[u32]) -> Result<Zeroizing<[u8; 32]>, KeyError> {
    let mut node = ExtendedKey::master(seed)?;
    for &index in indices {
        node = node.child(index)?;
    }
    Ok(node.key)
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, KeyError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| KeyError::DerivationFailed(format!("HMAC init failed: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    let mut digest = mac.finalize().into_bytes();
    out.copy_from_slice(&digest);
    digest.zeroize();
    Ok(out)
}

fn split(buf: Zeroizing<[u8; 64]>) -> ExtendedKey {
    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&buf[..32]);
    chain_code.copy_from_slice(&buf[32..]);
    ExtendedKey { key, chain_code }
}
