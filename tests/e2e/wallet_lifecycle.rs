//! End-to-end wallet flows against a real SQLite file.
//!
//! Exercises:
//!
//! 1. Generate → save → unlock → derive
//! 2. Import with messy input → canonical vault
//! 3. Add accounts → restart → same accounts
//! 4. Password change
//! 5. Both chains from one phrase
//!
//! Run with: cargo test --test wallet_lifecycle

use seedvault_core::store::{
    clear, load_account_count, load_vault, ACCOUNT_COUNT_KEY, ENCRYPTED_VAULT_KEY,
};
use seedvault_core::{
    change_password, create_vault, derive_accounts, seed_from_phrase, Chain, EncryptedVault,
    KdfParams, RecoveryPhrase, SessionError, VaultCodec, VaultStore, WalletSession, WordCount,
};
use seedvault_store::SqliteStore;
use tempfile::NamedTempFile;

const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PASSWORD: &str = "correct horse battery";

fn codec() -> VaultCodec {
    VaultCodec::new(KdfParams::new(1024, 1, 1).unwrap()).unwrap()
}

fn db() -> NamedTempFile {
    NamedTempFile::new().expect("create temp file")
}

// ============================================================================
// 1. Generate and unlock
// ============================================================================

#[test]
fn test_generate_save_unlock() {
    let file = db();
    let store = SqliteStore::open(file.path()).unwrap();

    let phrase = RecoveryPhrase::generate(WordCount::TwentyFour).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();

    let session = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
    assert_eq!(session.phrase(), &phrase);
    assert_eq!(session.accounts().len(), 1);

    // Same account as deriving straight from the phrase
    let seed = seed_from_phrase(&phrase, "");
    let direct = derive_accounts(seed.as_bytes(), Chain::Solana, 1).unwrap();
    assert_eq!(session.accounts(), &direct[..]);
}

#[test]
fn test_stored_blob_is_base64_with_embedded_params() {
    let file = db();
    let store = SqliteStore::open(file.path()).unwrap();
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();

    let blob = load_vault(&store).unwrap().unwrap();
    assert!(!blob.contains("abandon"));
    let vault = EncryptedVault::parse(&blob).unwrap();
    assert_eq!(vault.params(), codec().params());

    // A codec with different defaults still opens it
    let other = VaultCodec::new(KdfParams::new(2048, 2, 1).unwrap()).unwrap();
    assert_eq!(other.decrypt(&vault, PASSWORD).unwrap().as_str(), PHRASE);
}

// ============================================================================
// 2. Import normalization
// ============================================================================

#[test]
fn test_import_messy_phrase() {
    let file = db();
    let store = SqliteStore::open(file.path()).unwrap();

    let messy = "\n  Abandon ABANDON abandon abandon   abandon abandon\tabandon abandon abandon abandon abandon ABOUT  ";
    let phrase = RecoveryPhrase::parse(messy).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();

    let session = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
    assert_eq!(session.phrase().as_str(), PHRASE);
    assert_eq!(
        session.accounts()[0].address,
        "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk"
    );
}

// ============================================================================
// 3. Accounts survive restart
// ============================================================================

#[test]
fn test_accounts_rederived_after_restart() {
    let file = db();
    let before: Vec<String> = {
        let store = SqliteStore::open(file.path()).unwrap();
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();

        let mut session =
            WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
        session.add_account(&store).unwrap();
        session.add_account(&store).unwrap();
        session.accounts().iter().map(|a| a.address.clone()).collect()
    };

    let store = SqliteStore::open(file.path()).unwrap();
    assert_eq!(load_account_count(&store).unwrap(), 3);
    assert_eq!(store.get(ACCOUNT_COUNT_KEY).unwrap().as_deref(), Some("3"));

    let session = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
    let after: Vec<String> = session.accounts().iter().map(|a| a.address.clone()).collect();
    assert_eq!(before, after);
    assert_eq!(
        after,
        [
            "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk",
            "Hh8QwFUA6MtVu1qAoq12ucvFHNwCcVTV7hpWjeY1Hztb",
            "7WktogJEd2wQ9eH2oWusmcoFTgeYi6rS632UviTBJ2jm",
        ]
    );
    // Indices are strictly increasing and unique
    let indices: Vec<u32> = session.accounts().iter().map(|a| a.index).collect();
    assert_eq!(indices, [0, 1, 2]);
}

#[test]
fn test_recreate_resets_account_count() {
    let file = db();
    let store = SqliteStore::open(file.path()).unwrap();
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();

    let mut session = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Ethereum).unwrap();
    session.add_account(&store).unwrap();
    assert_eq!(load_account_count(&store).unwrap(), 2);

    let fresh = RecoveryPhrase::generate(WordCount::Twelve).unwrap();
    create_vault(&store, &codec(), &fresh, PASSWORD).unwrap();
    assert_eq!(load_account_count(&store).unwrap(), 1);
}

// ============================================================================
// 4. Password change
// ============================================================================

#[test]
fn test_change_password_end_to_end() {
    let file = db();
    let store = SqliteStore::open(file.path()).unwrap();
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();
    let old_blob = store.get(ENCRYPTED_VAULT_KEY).unwrap().unwrap();

    change_password(&store, &codec(), PASSWORD, "a different passphrase").unwrap();
    let new_blob = store.get(ENCRYPTED_VAULT_KEY).unwrap().unwrap();
    assert_ne!(old_blob, new_blob);

    assert!(matches!(
        WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana),
        Err(SessionError::UnlockFailed)
    ));
    let session =
        WalletSession::unlock(&store, &codec(), "a different passphrase", Chain::Solana).unwrap();
    assert_eq!(session.phrase().as_str(), PHRASE);
}

// ============================================================================
// 5. Both chains from one phrase
// ============================================================================

#[test]
fn test_one_phrase_two_chains() {
    let file = db();
    let store = SqliteStore::open(file.path()).unwrap();
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();

    let sol = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana).unwrap();
    let eth = WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Ethereum).unwrap();

    assert_eq!(
        sol.accounts()[0].address,
        "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk"
    );
    assert_eq!(
        eth.accounts()[0].address,
        "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
    );
    assert_eq!(
        eth.accounts()[0].private_key(),
        "0x1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
    );
}

#[test]
fn test_clear_then_unlock_fails() {
    let file = db();
    let store = SqliteStore::open(file.path()).unwrap();
    let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
    create_vault(&store, &codec(), &phrase, PASSWORD).unwrap();

    clear(&store).unwrap();
    assert!(matches!(
        WalletSession::unlock(&store, &codec(), PASSWORD, Chain::Solana),
        Err(SessionError::UnlockFailed)
    ));
}
