// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockbox status` command implementation.
//!
//! Reports key store state, key fingerprint, and whether a vault and PIN are
//! present. Decrypts nothing, so it needs no PIN.

use std::io::IsTerminal;

use lockbox_vault::{KeyStoreState, VaultService, VaultStatus};
use serde::Serialize;

use crate::error::CliError;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub key_store: String,
    pub missing_key_files: Vec<String>,
    pub rsa_bits: Option<usize>,
    pub fingerprint: Option<String>,
    pub vault_present: bool,
    pub pin_configured: bool,
    pub data_dir: String,
}

impl StatusResponse {
    fn new(status: &VaultStatus, data_dir: String) -> Self {
        let (key_store, missing_key_files) = match &status.key_store {
            KeyStoreState::Absent => ("absent", Vec::new()),
            KeyStoreState::Complete => ("complete", Vec::new()),
            KeyStoreState::Partial { missing } => (
                "partial",
                missing.iter().map(|p| p.display().to_string()).collect(),
            ),
        };
        Self {
            key_store: key_store.to_string(),
            missing_key_files,
            rsa_bits: status.modulus_bits,
            fingerprint: status.fingerprint.clone(),
            vault_present: status.vault_present,
            pin_configured: status.pin_configured,
            data_dir,
        }
    }
}

/// Run the `lockbox status` command.
pub fn run_status(service: &VaultService, data_dir: &str, json: bool) -> Result<(), CliError> {
    let status = service.status()?;
    let response = StatusResponse::new(&status, data_dir.to_string());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        print_status(&response, std::io::stdout().is_terminal());
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  lockbox status");
    println!("  {}", "-".repeat(35));

    let keys = match status.key_store.as_str() {
        "complete" => status
            .rsa_bits
            .map(|bits| format!("ready (RSA-{bits})"))
            .unwrap_or_else(|| "ready".to_string()),
        "absent" => "not initialized".to_string(),
        _ => format!("CORRUPT, missing {}", status.missing_key_files.join(", ")),
    };

    if use_color {
        use colored::Colorize;
        let state = match status.key_store.as_str() {
            "complete" => format!("{} {}", "✓".green(), keys.green()),
            "absent" => format!("{} {}", "-".yellow(), keys.yellow()),
            _ => format!("{} {}", "✗".red(), keys.red()),
        };
        println!("    Keys:        {state}");
    } else {
        let tag = match status.key_store.as_str() {
            "complete" => "[OK]",
            "absent" => "[--]",
            _ => "[FAIL]",
        };
        println!("    Keys:        {tag} {keys}");
    }

    if let Some(fingerprint) = &status.fingerprint {
        println!("    Fingerprint: {}", format_fingerprint(fingerprint));
    }
    println!("    Vault:       {}", if status.vault_present { "present" } else { "absent" });
    println!("    PIN:         {}", if status.pin_configured { "set" } else { "not set" });
    println!("    Directory:   {}", status.data_dir);
    println!();

    if status.key_store == "absent" {
        println!("  Create the vault with: lockbox init");
        println!();
    }
}

/// Colon-separated pairs of the first 16 bytes, e.g. `ab:cd:...`.
fn format_fingerprint(hex: &str) -> String {
    hex.as_bytes()
        .chunks(2)
        .take(16)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}
