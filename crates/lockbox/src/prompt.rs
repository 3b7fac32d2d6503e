// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PIN and password acquisition via the LOCKBOX_PIN environment variable or a
//! TTY prompt.

use std::io::IsTerminal;

use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::error::CliError;

/// The environment variable name for providing the PIN.
pub const PIN_ENV_VAR: &str = "LOCKBOX_PIN";

/// Get the PIN from `LOCKBOX_PIN` or an interactive prompt.
pub fn read_pin() -> Result<SecretString, CliError> {
    if let Some(pin) = pin_from_env() {
        return Ok(pin);
    }
    let pin = prompt_secret("PIN: ")?;
    non_empty(pin, "PIN")
}

/// Get a new PIN. The interactive prompt asks twice.
pub fn read_new_pin() -> Result<SecretString, CliError> {
    if let Some(pin) = pin_from_env() {
        return Ok(pin);
    }
    let first = prompt_secret("New PIN: ")?;
    let second = prompt_secret("Confirm PIN: ")?;
    if *first != *second {
        return Err(CliError::Prompt("PINs do not match".to_string()));
    }
    non_empty(first, "PIN")
}

/// Read a password interactively. There is no environment fallback.
pub fn read_password(label: &str) -> Result<String, CliError> {
    let password = prompt_secret(&format!("Password for {label}: "))?;
    if password.is_empty() {
        return Err(CliError::Prompt("empty password not allowed".to_string()));
    }
    Ok(password.to_string())
}

fn pin_from_env() -> Option<SecretString> {
    std::env::var(PIN_ENV_VAR)
        .ok()
        .filter(|pin| !pin.is_empty())
        .map(SecretString::from)
}

fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Prompt(format!(
            "no terminal to prompt on; set {PIN_ENV_VAR} or pass the value as an argument"
        )));
    }
    eprint!("{prompt}");
    rpassword::read_password()
        .map(Zeroizing::new)
        .map_err(|e| CliError::Prompt(format!("failed to read input: {e}")))
}

fn non_empty(value: Zeroizing<String>, what: &str) -> Result<SecretString, CliError> {
    if value.is_empty() {
        return Err(CliError::Prompt(format!("empty {what} not allowed")));
    }
    Ok(SecretString::from(value.as_str().to_owned()))
}
