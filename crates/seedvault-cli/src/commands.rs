//! Wallet commands.
//!
//! Each command takes its secrets as arguments and writes its report to
//! `out`; prompting happens in `main`.

use anyhow::{bail, Context, Result};
use seedvault_core::store::{clear, load_account_count, load_vault};
use seedvault_core::{
    change_password, create_vault, estimate_entropy, Account, Chain, EncryptedVault,
    RecoveryPhrase, SessionError, VaultCodec, VaultStore, WalletSession, WordCount,
};
use std::io::Write;

/// Vault inputs shared by every command
pub struct Wallet<'a, S> {
    pub store: &'a S,
    pub codec: VaultCodec,
    pub chain: Chain,
}

impl<S: VaultStore> Wallet<'_, S> {
    pub fn has_vault(&self) -> Result<bool> {
        Ok(load_vault(self.store)?.is_some())
    }

    fn ensure_absent(&self, force: bool) -> Result<()> {
        if !force && self.has_vault()? {
            bail!("A vault already exists; pass --force to overwrite it");
        }
        Ok(())
    }

    fn unlock(&self, password: &str) -> Result<WalletSession> {
        WalletSession::unlock(self.store, &self.codec, password, self.chain).map_err(|e| match e {
            SessionError::UnlockFailed => anyhow::anyhow!("Wrong password or no wallet found"),
            other => anyhow::Error::new(other).context("Failed to unlock wallet"),
        })
    }

    /// Create a vault around a fresh phrase and print the phrase once
    pub fn generate(
        &self,
        words: WordCount,
        password: &str,
        force: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        self.ensure_absent(force)?;
        let phrase = RecoveryPhrase::generate(words)?;
        self.save(&phrase, password, out)?;

        writeln!(out, "\nRecovery phrase (write it down, it is shown once):\n")?;
        for (i, word) in phrase.words().enumerate() {
            writeln!(out, "  {:>2}. {}", i + 1, word)?;
        }
        writeln!(out)?;
        self.print_first_account(password, out)
    }

    /// Create a vault around an existing phrase
    pub fn import(
        &self,
        phrase_text: &str,
        password: &str,
        force: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        self.ensure_absent(force)?;
        let phrase = RecoveryPhrase::parse(phrase_text).context("Invalid recovery phrase")?;
        self.save(&phrase, password, out)?;
        self.print_first_account(password, out)
    }

    fn save(&self, phrase: &RecoveryPhrase, password: &str, out: &mut impl Write) -> Result<()> {
        for warning in estimate_entropy(password).warnings {
            writeln!(out, "warning: {}", warning)?;
        }
        create_vault(self.store, &self.codec, phrase, password)?;
        writeln!(out, "Vault saved.")?;
        Ok(())
    }

    fn print_first_account(&self, password: &str, out: &mut impl Write) -> Result<()> {
        let session = self.unlock(password)?;
        for account in session.accounts() {
            print_account(account, out)?;
        }
        Ok(())
    }

    pub fn accounts(&self, password: &str, out: &mut impl Write) -> Result<()> {
        let session = self.unlock(password)?;
        writeln!(out, "{} accounts:", session.chain())?;
        for account in session.accounts() {
            print_account(account, out)?;
        }
        Ok(())
    }

    pub fn add_account(&self, password: &str, out: &mut impl Write) -> Result<()> {
        let mut session = self.unlock(password)?;
        let account = session.add_account(self.store)?;
        print_account(account, out)
    }

    pub fn export_key(&self, password: &str, index: u32, out: &mut impl Write) -> Result<()> {
        let session = self.unlock(password)?;
        let Some(account) = session.account(index) else {
            bail!(
                "No account #{}; {} account(s) exist",
                index,
                session.accounts().len()
            );
        };
        writeln!(out, "{}", account.private_key())?;
        Ok(())
    }

    pub fn reveal(&self, password: &str, out: &mut impl Write) -> Result<()> {
        let session = self.unlock(password)?;
        writeln!(out, "{}", session.phrase().as_str())?;
        Ok(())
    }

    pub fn passwd(&self, old: &str, new: &str, out: &mut impl Write) -> Result<()> {
        for warning in estimate_entropy(new).warnings {
            writeln!(out, "warning: {}", warning)?;
        }
        change_password(self.store, &self.codec, old, new).map_err(|e| match e {
            SessionError::UnlockFailed => anyhow::anyhow!("Wrong password or no wallet found"),
            other => anyhow::Error::new(other),
        })?;
        writeln!(out, "Password changed.")?;
        Ok(())
    }

    /// Delete the vault after confirming the password.
    ///
    /// A missing or unparseable blob cannot be unlocked by anyone, so it is
    /// cleared without the password check.
    pub fn reset(&self, password: &str, out: &mut impl Write) -> Result<()> {
        let readable = load_vault(self.store)?
            .is_some_and(|blob| EncryptedVault::parse(&blob).is_ok());
        if readable {
            drop(self.unlock(password)?);
        } else {
            log::warn!("Stored vault is missing or unreadable, clearing without unlock");
        }
        match load_account_count(self.store) {
            Ok(count) if readable => {
                writeln!(out, "Wallet removed ({} account(s) forgotten).", count)?
            }
            _ => writeln!(out, "Wallet state removed.")?,
        }
        clear(self.store)?;
        Ok(())
    }
}

fn print_account(account: &Account, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "  #{:<3} {:<20} {}",
        account.index,
        account.path.to_string(),
        account.address
    )?;
    Ok(())
}
