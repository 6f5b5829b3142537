//! SeedVault: command-line wallet holding one encrypted recovery phrase
//!
//! # Usage
//!
//! ```bash
//! seedvault generate --words 24
//! seedvault import < phrase.txt
//! seedvault accounts --chain ethereum
//! seedvault export-key 0
//! ```

mod commands;
mod config;

use anyhow::{bail, Context, Result};
use commands::Wallet;
use seedvault_core::{Chain, VaultCodec, WordCount};
use seedvault_store::SqliteStore;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use zeroize::Zeroizing;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Generate { words: WordCount, force: bool },
    Import { force: bool },
    Accounts,
    AddAccount,
    ExportKey { index: u32 },
    Reveal,
    Passwd,
    Reset { yes: bool },
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cli {
    config_path: Option<PathBuf>,
    chain: Option<Chain>,
    command: Command,
}

/// Parse arguments (without the program name)
fn parse_args(args: &[String]) -> Result<Cli> {
    let mut config_path = None;
    let mut chain = None;
    let mut words = WordCount::Twelve;
    let mut force = false;
    let mut yes = false;
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--config requires a path argument");
                };
                config_path = Some(PathBuf::from(path));
            }
            "--chain" => {
                i += 1;
                let Some(name) = args.get(i) else {
                    bail!("--chain requires a chain name");
                };
                chain = Some(name.parse::<Chain>()?);
            }
            "--words" => {
                i += 1;
                let Some(n) = args.get(i) else {
                    bail!("--words requires 12 or 24");
                };
                let n: usize = n.parse().context("--words requires 12 or 24")?;
                words = WordCount::from_words(n)?;
            }
            "--force" => force = true,
            "--yes" => yes = true,
            "--help" | "-h" => {
                return Ok(Cli {
                    config_path,
                    chain,
                    command: Command::Help,
                })
            }
            "--version" | "-V" => {
                return Ok(Cli {
                    config_path,
                    chain,
                    command: Command::Version,
                })
            }
            other if other.starts_with('-') => bail!("Unknown argument: {}", other),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = match positional.first().map(String::as_str) {
        None => Command::Help,
        Some("generate") => Command::Generate { words, force },
        Some("import") => Command::Import { force },
        Some("accounts") => Command::Accounts,
        Some("add-account") => Command::AddAccount,
        Some("export-key") => {
            let Some(index) = positional.get(1) else {
                bail!("export-key requires an account index");
            };
            let index = index
                .parse()
                .with_context(|| format!("Invalid account index: {}", index))?;
            Command::ExportKey { index }
        }
        Some("reveal") => Command::Reveal,
        Some("passwd") => Command::Passwd,
        Some("reset") => Command::Reset { yes },
        Some(other) => bail!("Unknown command: {}", other),
    };

    let expected = if matches!(command, Command::ExportKey { .. }) { 2 } else { 1 };
    if positional.len() > expected {
        bail!("Unexpected argument: {}", positional[expected]);
    }

    Ok(Cli {
        config_path,
        chain,
        command,
    })
}

/// Line-oriented prompts on stdin/stderr
struct Prompt<R> {
    input: R,
}

impl<R: BufRead> Prompt<R> {
    fn line(&mut self, label: &str) -> Result<Zeroizing<String>> {
        eprint!("{}: ", label);
        io::stderr().flush()?;
        let mut buf = Zeroizing::new(String::new());
        let n = self.input.read_line(&mut buf)?;
        if n == 0 {
            bail!("Unexpected end of input while reading {}", label.to_lowercase());
        }
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        Ok(trimmed)
    }

    /// Password from `SEEDVAULT_PASSWORD`, else stdin
    fn password(&mut self) -> Result<Zeroizing<String>> {
        if let Ok(v) = std::env::var("SEEDVAULT_PASSWORD") {
            return Ok(Zeroizing::new(v));
        }
        self.line("Password")
    }

    /// New password typed twice
    fn new_password(&mut self) -> Result<Zeroizing<String>> {
        let first = self.line("New password")?;
        let second = self.line("Confirm new password")?;
        if first != second {
            bail!("Passwords do not match");
        }
        Ok(first)
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    match cli.command {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Version => {
            println!("seedvault {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let config = config::WalletConfig::load(cli.config_path.as_deref())?;

    // Init logger
    std::env::set_var("RUST_LOG", &config.wallet.log_level);
    env_logger::init();

    let store = SqliteStore::open(&config.storage.db_path).with_context(|| {
        format!(
            "Failed to open wallet database {}",
            config.storage.db_path.display()
        )
    })?;
    let wallet = Wallet {
        store: &store,
        codec: VaultCodec::new(config.kdf)?,
        chain: match cli.chain {
            Some(chain) => chain,
            None => config.chain()?,
        },
    };
    log::debug!(
        "Using {} on {}",
        config.storage.db_path.display(),
        wallet.chain
    );

    let stdin = io::stdin();
    let mut prompt = Prompt {
        input: stdin.lock(),
    };
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Generate { words, force } => {
            let password = new_vault_password(&mut prompt)?;
            wallet.generate(words, &password, force, &mut out)
        }
        Command::Import { force } => {
            let phrase = prompt.line("Recovery phrase")?;
            let password = new_vault_password(&mut prompt)?;
            wallet.import(&phrase, &password, force, &mut out)
        }
        Command::Accounts => wallet.accounts(&prompt.password()?, &mut out),
        Command::AddAccount => wallet.add_account(&prompt.password()?, &mut out),
        Command::ExportKey { index } => wallet.export_key(&prompt.password()?, index, &mut out),
        Command::Reveal => wallet.reveal(&prompt.password()?, &mut out),
        Command::Passwd => {
            let old = prompt.line("Current password")?;
            let new = prompt.new_password()?;
            wallet.passwd(&old, &new, &mut out)
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("reset deletes the vault; pass --yes to confirm");
            }
            wallet.reset(&prompt.password()?, &mut out)
        }
        Command::Help | Command::Version => Ok(()),
    }
}

fn new_vault_password<R: BufRead>(prompt: &mut Prompt<R>) -> Result<Zeroizing<String>> {
    if let Ok(v) = std::env::var("SEEDVAULT_PASSWORD") {
        return Ok(Zeroizing::new(v));
    }
    prompt.new_password()
}

fn print_help() {
    println!(
        r#"SeedVault: encrypted recovery-phrase wallet

USAGE:
    seedvault [OPTIONS] <COMMAND>

COMMANDS:
    generate [--words 12|24] [--force]   Create a wallet with a new phrase
    import [--force]                     Create a wallet from an existing phrase
    accounts                             List derived accounts
    add-account                          Derive and remember the next account
    export-key <INDEX>                   Print one account's private key
    reveal                               Print the recovery phrase
    passwd                               Re-encrypt under a new password
    reset --yes                          Delete the wallet

OPTIONS:
    -c, --config <PATH>   Config file path
    --chain <CHAIN>       solana or ethereum (overrides config)
    -h, --help            Show this help message
    -V, --version         Show version

ENVIRONMENT VARIABLES (override config file):
    SEEDVAULT_DB_PATH       SQLite database path
    SEEDVAULT_CHAIN         Default chain
    SEEDVAULT_LOG_LEVEL     Log level (error/warn/info/debug/trace)
    SEEDVAULT_KDF_M_COST    Argon2id memory cost in KiB for new vaults
    SEEDVAULT_PASSWORD      Wallet password (skips the prompt)
"#
    );
}
