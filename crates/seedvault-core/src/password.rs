//! Vault password policy
//!
//! One hard rule: a vault password has at least [`MIN_PASSWORD_LEN`]
//! characters. Everything else is advisory. [`estimate_entropy`] grades the
//! password and lists warnings for the caller to show, but never rejects.

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Shortest password accepted when creating or re-encrypting a vault
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least {min} characters (got {len})")]
    TooShort { len: usize, min: usize },
}

/// Enforce the length policy. Length counts Unicode scalar values.
pub fn check_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort {
            len,
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    /// < 28 bits
    Dangerous,
    /// 28 to 35 bits
    Weak,
    /// 36 to 59 bits
    Fair,
    /// 60 to 127 bits
    Strong,
    /// 128 bits and up
    Excellent,
}

impl PasswordStrength {
    fn from_bits(bits: f64) -> Self {
        match bits {
            b if b < 28.0 => Self::Dangerous,
            b if b < 36.0 => Self::Weak,
            b if b < 60.0 => Self::Fair,
            b if b < 128.0 => Self::Strong,
            _ => Self::Excellent,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dangerous => "dangerous",
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Strong => "strong",
            Self::Excellent => "excellent",
        }
    }

    pub fn is_recommended(&self) -> bool {
        *self >= Self::Strong
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordWarning {
    Empty,
    BelowMinimum,
    Short,
    CommonWord,
    Repeated,
    Sequential,
    SingleClass,
}

impl fmt::Display for PasswordWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Empty => "password is empty",
            Self::BelowMinimum => "password is shorter than 8 characters",
            Self::Short => "12 or more characters are recommended",
            Self::CommonWord => "contains a commonly used password or word",
            Self::Repeated => "too many repeated characters",
            Self::Sequential => "contains sequential runs like abc or 321",
            Self::SingleClass => "uses a single character class",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone)]
pub struct PasswordAnalysis {
    pub entropy_bits: f64,
    pub strength: PasswordStrength,
    pub warnings: Vec<PasswordWarning>,
}

impl PasswordAnalysis {
    pub fn has(&self, warning: PasswordWarning) -> bool {
        self.warnings.contains(&warning)
    }
}

/// Words that show up first in wallet-targeted dictionary attacks
const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "qwerty", "abc123", "letmein", "iloveyou", "admin",
    "welcome", "monkey", "dragon", "master", "sunshine", "trustno1", "passw0rd", "wallet",
    "crypto", "solana", "ethereum", "bitcoin", "metamask", "phantom", "seedphrase", "mnemonic",
    "hodl", "tothemoon",
];

/// Estimated search-space bits after pattern penalties
pub fn estimate_entropy(password: &str) -> PasswordAnalysis {
    if password.is_empty() {
        return PasswordAnalysis {
            entropy_bits: 0.0,
            strength: PasswordStrength::Dangerous,
            warnings: vec![PasswordWarning::Empty],
        };
    }

    let chars: Vec<char> = password.chars().collect();
    let len = chars.len();
    let mut warnings = Vec::new();

    let classes = CharClasses::scan(&chars);
    let mut bits = len as f64 * classes.alphabet_size().log2();

    let lower = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|w| lower.contains(w)) {
        bits = bits.min(20.0);
        warnings.push(PasswordWarning::CommonWord);
    }

    let unique = chars.iter().collect::<HashSet<_>>().len();
    let unique_ratio = unique as f64 / len as f64;
    if unique_ratio < 0.5 {
        bits *= unique_ratio * 2.0;
        warnings.push(PasswordWarning::Repeated);
    }

    let runs = sequential_runs(&chars);
    if runs > 2 {
        bits -= runs as f64 * 3.0;
        warnings.push(PasswordWarning::Sequential);
    }

    if classes.count() == 1 && len < 12 {
        warnings.push(PasswordWarning::SingleClass);
    }

    if len < MIN_PASSWORD_LEN {
        warnings.push(PasswordWarning::BelowMinimum);
    } else if len < 12 {
        warnings.push(PasswordWarning::Short);
    }

    let entropy_bits = bits.max(0.0);
    PasswordAnalysis {
        entropy_bits,
        strength: PasswordStrength::from_bits(entropy_bits),
        warnings,
    }
}

#[derive(Default)]
struct CharClasses {
    lower: bool,
    upper: bool,
    digit: bool,
    symbol: bool,
    other: bool,
}

impl CharClasses {
    fn scan(chars: &[char]) -> Self {
        let mut classes = Self::default();
        for &c in chars {
            match c {
                'a'..='z' => classes.lower = true,
                'A'..='Z' => classes.upper = true,
                '0'..='9' => classes.digit = true,
                c if c.is_ascii_punctuation() || c == ' ' => classes.symbol = true,
                _ => classes.other = true,
            }
        }
        classes
    }

    fn flags(&self) -> [(bool, f64); 5] {
        [
            (self.lower, 26.0),
            (self.upper, 26.0),
            (self.digit, 10.0),
            (self.symbol, 33.0),
            (self.other, 100.0),
        ]
    }

    fn count(&self) -> usize {
        self.flags().iter().filter(|(set, _)| *set).count()
    }

    fn alphabet_size(&self) -> f64 {
        self.flags()
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, size)| size)
            .sum::<f64>()
            .max(2.0)
    }
}

/// Windows of three consecutive code points stepping by +1 or -1
fn sequential_runs(chars: &[char]) -> usize {
    chars
        .windows(3)
        .filter(|w| {
            let (a, b, c) = (w[0] as i64, w[1] as i64, w[2] as i64);
            (b - a == 1 && c - b == 1) || (a - b == 1 && b - c == 1)
        })
        .count()
}
