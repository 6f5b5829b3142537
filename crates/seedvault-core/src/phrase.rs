//! BIP-39 recovery phrase handling
//!
//! Generation, import normalization, and checksum validation. Only 12- and
//! 24-word English phrases are accepted.

use bip39::{Language, Mnemonic};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhraseError {
    #[error("Invalid word count: {0}. Expected 12 or 24 words.")]
    InvalidWordCount(usize),
    #[error("Word #{0} is not in the BIP-39 English word list")]
    UnknownWord(usize),
    #[error("Checksum validation failed")]
    InvalidChecksum,
    #[error("Invalid recovery phrase: {0}")]
    Invalid(String),
}

/// Supported phrase lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordCount {
    /// 128 bits of entropy
    #[default]
    Twelve,
    /// 256 bits of entropy
    TwentyFour,
}

impl WordCount {
    pub const fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::TwentyFour => 24,
        }
    }

    pub const fn entropy_bits(self) -> usize {
        match self {
            WordCount::Twelve => 128,
            WordCount::TwentyFour => 256,
        }
    }

    pub fn from_words(count: usize) -> Result<Self, PhraseError> {
        match count {
            12 => Ok(WordCount::Twelve),
            24 => Ok(WordCount::TwentyFour),
            other => Err(PhraseError::InvalidWordCount(other)),
        }
    }
}

/// A checksum-valid recovery phrase in canonical form.
///
/// The canonical form is lowercase with words joined by single spaces. Both
/// the text and the decoded word indices are wiped on drop, and `Debug`
/// never prints the words.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoveryPhrase {
    mnemonic: Mnemonic,
    phrase: Zeroizing<String>,
    word_count: WordCount,
}

impl Drop for RecoveryPhrase {
    fn drop(&mut self) {
        self.mnemonic.zeroize();
    }
}

impl ZeroizeOnDrop for RecoveryPhrase {}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryPhrase")
            .field("word_count", &self.word_count.words())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl RecoveryPhrase {
    /// Generate a fresh phrase from OS randomness
    pub fn generate(word_count: WordCount) -> Result<Self, PhraseError> {
        let mnemonic = Mnemonic::generate_in(Language::English, word_count.words())
            .map_err(|e| PhraseError::Invalid(e.to_string()))?;
        Ok(Self::from_mnemonic(mnemonic, word_count))
    }

    /// Parse user input into a validated phrase.
    ///
    /// Leading/trailing whitespace is dropped, runs of whitespace collapse to
    /// one space, and letters are lowercased before validation.
    pub fn parse(input: &str) -> Result<Self, PhraseError> {
        let lowered = Zeroizing::new(input.to_lowercase());
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let word_count = WordCount::from_words(words.len())?;
        let normalized = Zeroizing::new(words.join(" "));

        let mnemonic = Mnemonic::parse_in(Language::English, normalized.as_str())
            .map_err(map_bip39_error)?;
        Ok(Self::from_mnemonic(mnemonic, word_count))
    }

    /// Whether `input` would pass [`RecoveryPhrase::parse`]
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    fn from_mnemonic(mnemonic: Mnemonic, word_count: WordCount) -> Self {
        let phrase = Zeroizing::new(mnemonic.to_string());
        Self {
            mnemonic,
            phrase,
            word_count,
        }
    }

    /// The canonical phrase text.
    ///
    /// Handle with care: this is the wallet secret.
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.phrase.split(' ')
    }

    pub fn word_count(&self) -> WordCount {
        self.word_count
    }

    /// BIP-39 seed stretching (PBKDF2-HMAC-SHA512, 2048 rounds)
    pub(crate) fn to_seed_bytes(&self, passphrase: &str) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.mnemonic.to_seed(passphrase))
    }
}

fn map_bip39_error(err: bip39::Error) -> PhraseError {
    match err {
        bip39::Error::BadWordCount(n) => PhraseError::InvalidWordCount(n),
        bip39::Error::UnknownWord(idx) => PhraseError::UnknownWord(idx),
        bip39::Error::InvalidChecksum => PhraseError::InvalidChecksum,
        other => PhraseError::Invalid(other.to_string()),
    }
}
