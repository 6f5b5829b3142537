//! Unlocked wallet session
//!
//! A [`WalletSession`] owns the decrypted phrase, its seed, and the derived
//! accounts for one chain. Nothing derived is written back except the
//! account count. Dropping the session wipes the secrets.

use crate::chain::Chain;
use crate::keys::{derive_account, derive_accounts, seed_from_phrase, Account, KeyError, Seed};
use crate::password::{check_password, PasswordError};
use crate::phrase::RecoveryPhrase;
use crate::service::ChainService;
use crate::store::{
    load_account_count, load_vault, save_account_count, save_vault, StoreError, VaultStore,
    DEFAULT_ACCOUNT_COUNT,
};
use crate::vault::{EncryptedVault, VaultCodec, VaultError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Missing vault, malformed vault, or wrong password
    #[error("Unable to unlock wallet")]
    UnlockFailed,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Encrypt `phrase`, store it as the wallet vault, and reset the account
/// count to one. Overwrites any existing vault.
pub fn create_vault<S: VaultStore>(
    store: &S,
    codec: &VaultCodec,
    phrase: &RecoveryPhrase,
    password: &str,
) -> Result<EncryptedVault, SessionError> {
    check_password(password)?;
    let vault = codec.encrypt(phrase, password)?;
    save_vault(store, &vault)?;
    save_account_count(store, DEFAULT_ACCOUNT_COUNT)?;
    log::info!(
        "Vault created ({}-word phrase)",
        phrase.word_count().words()
    );
    Ok(vault)
}

/// Re-encrypt the stored vault under `new_password`. The account count is
/// left alone.
pub fn change_password<S: VaultStore>(
    store: &S,
    codec: &VaultCodec,
    old_password: &str,
    new_password: &str,
) -> Result<(), SessionError> {
    check_password(new_password)?;
    let vault = load_vault(store)?
        .and_then(|blob| EncryptedVault::parse(&blob).ok())
        .ok_or(SessionError::UnlockFailed)?;

    let reencrypted = codec
        .reencrypt(&vault, old_password, new_password)
        .map_err(|e| match e {
            VaultError::Rejected => SessionError::UnlockFailed,
            other => SessionError::Vault(other),
        })?;
    save_vault(store, &reencrypted)?;
    log::info!("Vault password changed");
    Ok(())
}

/// Balance lookup result for one account
#[derive(Debug)]
pub struct AccountBalance<'a, E> {
    pub account: &'a Account,
    pub balance: Result<u128, E>,
}

pub struct WalletSession {
    chain: Chain,
    phrase: RecoveryPhrase,
    seed: Seed,
    accounts: Vec<Account>,
}

impl zeroize::ZeroizeOnDrop for WalletSession {}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("chain", &self.chain)
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

impl WalletSession {
    /// Decrypt the stored vault and re-derive accounts `0..account_count`
    pub fn unlock<S: VaultStore>(
        store: &S,
        codec: &VaultCodec,
        password: &str,
        chain: Chain,
    ) -> Result<Self, SessionError> {
        let phrase = load_vault(store)?
            .and_then(|blob| codec.decrypt_blob(&blob, password))
            .ok_or_else(|| {
                log::warn!("Unlock failed");
                SessionError::UnlockFailed
            })?;

        let count = load_account_count(store)?;
        let seed = seed_from_phrase(&phrase, "");
        let accounts = derive_accounts(seed.as_bytes(), chain, count)?;
        log::info!("Unlocked wallet: {} {} account(s)", accounts.len(), chain);

        Ok(Self {
            chain,
            phrase,
            seed,
            accounts,
        })
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, index: u32) -> Option<&Account> {
        self.accounts.get(index as usize)
    }

    /// The decrypted recovery phrase, for the reveal flow
    pub fn phrase(&self) -> &RecoveryPhrase {
        &self.phrase
    }

    /// Derive the next account and persist the new count
    pub fn add_account<S: VaultStore>(&mut self, store: &S) -> Result<&Account, SessionError> {
        let index = u32::try_from(self.accounts.len())
            .map_err(|_| KeyError::IndexOutOfRange(u32::MAX))?;
        let account = derive_account(self.seed.as_bytes(), self.chain, index)?;
        save_account_count(store, index + 1)?;
        log::info!("Added {} account #{}", self.chain, index);

        self.accounts.push(account);
        Ok(&self.accounts[index as usize])
    }

    /// Re-derive the same number of accounts on another chain
    pub fn switch_chain(&mut self, chain: Chain) -> Result<(), SessionError> {
        if chain == self.chain {
            return Ok(());
        }
        let count = self.accounts.len() as u32;
        self.accounts = derive_accounts(self.seed.as_bytes(), chain, count)?;
        self.chain = chain;
        log::debug!("Switched session to {}", chain);
        Ok(())
    }

    /// Ask `service` for every account's balance. Failures are reported per
    /// account and do not stop the others.
    pub fn balances<'a, C: ChainService>(
        &'a self,
        service: &C,
    ) -> Vec<AccountBalance<'a, C::Error>> {
        self.accounts
            .iter()
            .map(|account| AccountBalance {
                account,
                balance: service.balance(&account.address),
            })
            .collect()
    }
}
