//! Ethereum address derivation
//!
//! `address = keccak256(uncompressed_pubkey[1..])[12..]`, rendered with the
//! EIP-55 mixed-case checksum.

use alloy_primitives::Address;
use bitcoin::secp256k1::PublicKey;
use tiny_keccak::{Hasher, Keccak};

pub const ADDRESS_LEN: usize = 20;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

/// Raw 20-byte address for a secp256k1 public key
pub fn address_bytes(public_key: &PublicKey) -> [u8; ADDRESS_LEN] {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; ADDRESS_LEN];
    address.copy_from_slice(&hash[12..]);
    address
}

/// EIP-55 checksummed `0x` address for a secp256k1 public key
pub fn address(public_key: &PublicKey) -> String {
    to_checksum(&address_bytes(public_key))
}

/// Render 20 address bytes with the EIP-55 checksum
pub fn to_checksum(address: &[u8; ADDRESS_LEN]) -> String {
    Address::new(*address).to_checksum(None)
}

/// Check `0x` + 40 hex digits, and the EIP-55 checksum when the input is
/// mixed case
pub fn is_valid_address(input: &str) -> bool {
    let Some(body) = input.strip_prefix("0x") else {
        return false;
    };
    if body.len() != ADDRESS_LEN * 2 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let all_lower = !body.bytes().any(|b| b.is_ascii_uppercase());
    let all_upper = !body.bytes().any(|b| b.is_ascii_lowercase());
    all_lower || all_upper || Address::parse_checksummed(input, None).is_ok()
}
