// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation from a character-class exclusion policy.
//!
//! Every character is drawn independently and uniformly from the candidate
//! alphabet using the operating system CSPRNG.

use std::collections::BTreeSet;

use rand::rngs::OsRng;
use rand::Rng;

use crate::error::VaultError;

/// A character class that can be excluded from generated passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Digit,
    Punctuation,
}

impl CharClass {
    pub const ALL: [CharClass; 4] = [
        CharClass::Lowercase,
        CharClass::Uppercase,
        CharClass::Digit,
        CharClass::Punctuation,
    ];

    /// The single-letter code used in exclusion strings.
    pub fn code(self) -> char {
        match self {
            CharClass::Lowercase => 'l',
            CharClass::Uppercase => 'u',
            CharClass::Digit => 'd',
            CharClass::Punctuation => 'p',
        }
    }

    /// Parse a single-letter class code.
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// The ASCII characters belonging to this class.
    pub fn chars(self) -> impl Iterator<Item = char> {
        (0x21u8..=0x7e).map(char::from).filter(move |c| match self {
            CharClass::Lowercase => c.is_ascii_lowercase(),
            CharClass::Uppercase => c.is_ascii_uppercase(),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Punctuation => c.is_ascii_punctuation(),
        })
    }
}

/// Which characters a generated password may not contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordPolicy {
    excluded_classes: BTreeSet<CharClass>,
    excluded_chars: BTreeSet<char>,
}

impl PasswordPolicy {
    /// A policy allowing all four classes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_class(mut self, class: CharClass) -> Self {
        self.excluded_classes.insert(class);
        self
    }

    pub fn exclude_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.excluded_chars.extend(chars);
        self
    }

    /// Parse an exclusion string such as `"lp #$%"`.
    ///
    /// Letters before the first space are class codes (`l`, `u`, `d`, `p`);
    /// every non-space character after it is individually disallowed.
    pub fn from_exclusions(exclusions: &str) -> Result<Self, VaultError> {
        let (codes, others) = exclusions.split_once(' ').unwrap_or((exclusions, ""));

        let mut policy = Self::new();
        for code in codes.chars() {
            let class = CharClass::from_code(code).ok_or_else(|| {
                VaultError::InvalidPolicy(format!(
                    "unknown character class `{code}` (expected l, u, d or p)"
                ))
            })?;
            policy.excluded_classes.insert(class);
        }
        policy
            .excluded_chars
            .extend(others.chars().filter(|c| !c.is_whitespace()));
        Ok(policy)
    }

    pub fn is_class_excluded(&self, class: CharClass) -> bool {
        self.excluded_classes.contains(&class)
    }

    /// The candidate alphabet: allowed classes minus disallowed characters.
    pub fn alphabet(&self) -> Vec<char> {
        CharClass::ALL
            .into_iter()
            .filter(|class| !self.excluded_classes.contains(class))
            .flat_map(CharClass::chars)
            .filter(|c| !self.excluded_chars.contains(c))
            .collect()
    }
}

/// Generate a password of exactly `length` characters under `policy`.
pub fn generate(length: usize, policy: &PasswordPolicy) -> Result<String, VaultError> {
    if length == 0 {
        return Err(VaultError::InvalidPolicy(
            "password length must be at least 1".to_string(),
        ));
    }

    let alphabet = policy.alphabet();
    if alphabet.is_empty() {
        return Err(VaultError::InvalidPolicy(
            "policy excludes every character".to_string(),
        ));
    }

    let mut rng = OsRng;
    let password = (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect::<String>();
    Ok(password)
}
