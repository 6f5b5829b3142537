//! Security-specific tests.
//!
//! These tests verify:
//! 1. Vault decryption fails closed on tampering
//! 2. Hostile blobs cannot request unbounded work
//! 3. Malformed inputs don't panic
//! 4. Failures are indistinguishable
//! 5. Secrets stay out of Debug output and are wiped on drop

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{Rng, RngCore};
use seedvault_core::store::ENCRYPTED_VAULT_KEY;
use seedvault_core::{
    create_vault, derive_account, seed_from_phrase, Account, Chain, EncryptedVault, KdfParams,
    MemoryStore, RecoveryPhrase, Seed, SessionError, VaultCodec, VaultError, VaultStore,
    WalletSession, WordCount,
};
use zeroize::ZeroizeOnDrop;

const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PASSWORD: &str = "correct horse battery staple";

const SALT_OFFSET: usize = 12;
const NONCE_OFFSET: usize = 28;
const CIPHERTEXT_OFFSET: usize = 40;

fn codec() -> VaultCodec {
    VaultCodec::new(KdfParams::new(256, 1, 1).unwrap()).unwrap()
}

fn sealed() -> Vec<u8> {
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    codec().encrypt(&phrase, PASSWORD).unwrap().to_bytes()
}

fn open(bytes: &[u8]) -> Option<RecoveryPhrase> {
    let vault = EncryptedVault::from_bytes(bytes).ok()?;
    codec().decrypt(&vault, PASSWORD)
}

// ============================================================================
// 1. Tampering
// ============================================================================

#[test]
fn test_untampered_blob_opens() {
    assert_eq!(open(&sealed()).unwrap().as_str(), PHRASE);
}

#[test]
fn test_tampered_salt_fails_decryption() {
    let mut bytes = sealed();
    bytes[SALT_OFFSET] ^= 0xFF;
    assert!(open(&bytes).is_none());
}

#[test]
fn test_tampered_nonce_fails_decryption() {
    let mut bytes = sealed();
    bytes[NONCE_OFFSET] ^= 0x01;
    assert!(open(&bytes).is_none());
}

#[test]
fn test_tampered_ciphertext_fails_decryption() {
    let original = sealed();
    for offset in [CIPHERTEXT_OFFSET, original.len() / 2 + 20, original.len() - 1] {
        let mut bytes = original.clone();
        bytes[offset] ^= 0x80;
        assert!(open(&bytes).is_none(), "flip at {} accepted", offset);
    }
}

#[test]
fn test_tampered_params_fail_decryption() {
    // t_cost 1 -> 2 is still in bounds, so the blob parses but the key differs
    let mut bytes = sealed();
    bytes[4] = 2;
    assert!(EncryptedVault::from_bytes(&bytes).is_ok());
    assert!(open(&bytes).is_none());
}

#[test]
fn test_truncated_blob_fails() {
    let bytes = sealed();
    for len in [0, 10, CIPHERTEXT_OFFSET, CIPHERTEXT_OFFSET + 16, bytes.len() - 1] {
        assert!(open(&bytes[..len]).is_none(), "truncated to {} accepted", len);
    }
}

#[test]
fn test_appended_bytes_fail() {
    let mut bytes = sealed();
    bytes.push(0);
    assert!(open(&bytes).is_none());
}

// ============================================================================
// 2. Hostile parameters
// ============================================================================

#[test]
fn test_oversized_params_rejected_before_kdf() {
    for (offset, value) in [(0usize, u32::MAX), (4, 10_000), (8, 255), (8, 0), (4, 0)] {
        let mut bytes = sealed();
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        assert_eq!(
            EncryptedVault::from_bytes(&bytes),
            Err(VaultError::InvalidFormat),
            "param at {} = {} accepted",
            offset,
            value
        );
        let text = STANDARD.encode(&bytes);
        assert!(codec().decrypt_blob(&text, PASSWORD).is_none());
    }
}

#[test]
fn test_codec_refuses_out_of_range_params() {
    assert!(KdfParams::new(4, 1, 1).is_err());
    assert!(KdfParams::new(1024, 0, 1).is_err());
    assert!(KdfParams::new(u32::MAX, 1, 1).is_err());
}

// ============================================================================
// 3. Malformed input doesn't panic
// ============================================================================

#[test]
fn test_vault_from_garbage_bytes_does_not_panic() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let len = rng.gen_range(0..200);
        let mut bytes = vec![0u8; len];
        rng.fill_bytes(&mut bytes);
        // Keep the params small so any blob that parses stays cheap to try
        if bytes.len() >= 12 {
            bytes[0..4].copy_from_slice(&64u32.to_le_bytes());
            bytes[4..8].copy_from_slice(&1u32.to_le_bytes());
            bytes[8..12].copy_from_slice(&1u32.to_le_bytes());
        }
        assert!(open(&bytes).is_none());
    }
}

#[test]
fn test_vault_parse_garbage_text_does_not_panic() {
    let inputs = [
        "",
        " ",
        "not base64!!",
        "====",
        "AAAA",
        "\u{0}\u{1}",
        "🔐🔐🔐🔐",
        &"A".repeat(10_000),
    ];
    for input in inputs {
        assert!(codec().decrypt_blob(input, PASSWORD).is_none());
    }
}

#[test]
fn test_parse_phrase_garbage_does_not_panic() {
    let inputs = [
        "",
        "   ",
        "abandon",
        &"abandon ".repeat(1000),
        "🔐 🔐 🔐 🔐 🔐 🔐 🔐 🔐 🔐 🔐 🔐 🔐",
        "\u{0} \u{0} \u{0} \u{0} \u{0} \u{0} \u{0} \u{0} \u{0} \u{0} \u{0} \u{0}",
        "abandon\u{a0}abandon",
    ];
    for input in inputs {
        assert!(RecoveryPhrase::parse(input).is_err(), "{:?} accepted", input);
    }
}

// ============================================================================
// 4. Uniform failures
// ============================================================================

#[test]
fn test_wrong_password_variants_all_fail() {
    let vault = EncryptedVault::from_bytes(&sealed()).unwrap();
    let long = "a".repeat(1000);
    let wrong_passwords = [
        "wrong1",
        "",
        long.as_str(),
        "correct horse battery stapl",
        "correct horse battery staple ",
        "Correct horse battery staple",
    ];
    for wp in wrong_passwords {
        assert!(codec().decrypt(&vault, wp).is_none(), "{:?} accepted", wp);
    }
}

#[test]
fn test_unlock_missing_and_wrong_are_identical() {
    let empty = MemoryStore::new();
    let missing = WalletSession::unlock(&empty, &codec(), PASSWORD, Chain::Solana).unwrap_err();

    let store = MemoryStore::new();
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();
    let wrong =
        WalletSession::unlock(&store, &codec(), "not the password", Chain::Solana).unwrap_err();

    let corrupt_store = MemoryStore::new();
    let mut bytes = sealed();
    bytes[CIPHERTEXT_OFFSET] ^= 1;
    corrupt_store
        .set(ENCRYPTED_VAULT_KEY, &STANDARD.encode(&bytes))
        .unwrap();
    let corrupt =
        WalletSession::unlock(&corrupt_store, &codec(), PASSWORD, Chain::Solana).unwrap_err();

    for err in [&missing, &wrong, &corrupt] {
        assert!(matches!(err, SessionError::UnlockFailed));
    }
    assert_eq!(missing.to_string(), wrong.to_string());
    assert_eq!(wrong.to_string(), corrupt.to_string());
}

#[test]
fn test_reencrypt_with_wrong_password_rejected() {
    let vault = EncryptedVault::from_bytes(&sealed()).unwrap();
    assert_eq!(
        codec().reencrypt(&vault, "nope nope", "new password"),
        Err(VaultError::Rejected)
    );
}

// ============================================================================
// 5. Secret hygiene
// ============================================================================

#[test]
fn test_debug_output_redacts_secrets() {
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    assert!(!format!("{:?}", phrase).contains("abandon"));

    let seed = seed_from_phrase(&phrase, "");
    let seed_hex = hex::encode(seed.as_bytes());
    assert!(!format!("{:?}", seed).contains(&seed_hex[..16]));

    let account = derive_account(seed.as_bytes(), Chain::Solana, 0).unwrap();
    assert!(!format!("{:?}", account).contains(account.private_key()));

    let vault = codec().encrypt(&phrase, PASSWORD).unwrap();
    assert!(!format!("{:?}", vault).contains("abandon"));

    let store = MemoryStore::new();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();
    let session = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
    let debug = format!("{:?}", session);
    assert!(!debug.contains("abandon"));
    assert!(!debug.contains(account.private_key()));
}

fn wiped_on_drop<T: ZeroizeOnDrop>() {}

#[test]
fn test_secret_holders_wipe_on_drop() {
    wiped_on_drop::<RecoveryPhrase>();
    wiped_on_drop::<Seed>();
    wiped_on_drop::<Account>();
    wiped_on_drop::<WalletSession>();

    // Dropping a session leaves stored state alone
    let store = MemoryStore::new();
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();
    let session = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
    let address = session.accounts()[0].address.clone();
    drop(session);

    let again = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
    assert_eq!(again.accounts()[0].address, address);
}

#[test]
fn test_ciphertext_not_deterministic() {
    let phrase = RecoveryPhrase::generate(WordCount::Twelve).unwrap();
    let a = codec().encrypt(&phrase, PASSWORD).unwrap().to_bytes();
    let b = codec().encrypt(&phrase, PASSWORD).unwrap().to_bytes();
    assert_ne!(a[SALT_OFFSET..NONCE_OFFSET], b[SALT_OFFSET..NONCE_OFFSET]);
    assert_ne!(a[NONCE_OFFSET..CIPHERTEXT_OFFSET], b[NONCE_OFFSET..CIPHERTEXT_OFFSET]);
    assert_ne!(a[CIPHERTEXT_OFFSET..], b[CIPHERTEXT_OFFSET..]);
}
