// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand handlers. Each calls the vault facade and prints the result.

use lockbox_config::LockboxConfig;
use lockbox_vault::{PasswordPolicy, PasswordSource, VaultError, VaultService};
use tracing::debug;

use crate::error::CliError;
use crate::prompt;

/// Shown in place of a password unless `--reveal` is given.
const MASKED: &str = "********";

/// Build a policy from an optional exclusion string such as `"p #"`.
pub fn policy_from(exclude: Option<&str>) -> Result<PasswordPolicy, VaultError> {
    exclude
        .map(PasswordPolicy::from_exclusions)
        .transpose()
        .map(Option::unwrap_or_default)
}

/// An explicit password wins; otherwise generate one.
pub fn password_source(
    password: Option<String>,
    length: Option<usize>,
    exclude: Option<&str>,
    default_length: usize,
) -> Result<PasswordSource, VaultError> {
    match password {
        Some(password) => Ok(PasswordSource::Manual(password)),
        None => Ok(PasswordSource::Generated {
            length: length.unwrap_or(default_length),
            policy: policy_from(exclude)?,
        }),
    }
}

/// Verify the PIN when one is configured.
pub fn require_pin(service: &VaultService) -> Result<(), CliError> {
    if !service.has_pin()? {
        return Ok(());
    }
    let pin = prompt::read_pin()?;
    if service.verify_pin(&pin)? {
        debug!("PIN accepted");
        Ok(())
    } else {
        Err(CliError::IncorrectPin)
    }
}

pub fn init(service: &VaultService) -> Result<(), CliError> {
    if service.initialize()? {
        println!("Vault created in {}", service.layout().vault.display());
        println!("Key fingerprint: {}", service.key_fingerprint()?);
    } else {
        println!("Vault already initialized.");
    }
    Ok(())
}

pub fn generate(
    service: &VaultService,
    config: &LockboxConfig,
    length: Option<usize>,
    exclude: Option<&str>,
) -> Result<(), CliError> {
    let policy = policy_from(exclude)?;
    let password =
        service.generate_password(length.unwrap_or(config.generator.default_length), &policy)?;
    println!("{password}");
    Ok(())
}

pub fn save(
    service: &VaultService,
    site: &str,
    username: &str,
    source: PasswordSource,
) -> Result<(), CliError> {
    require_pin(service)?;
    let generated = matches!(source, PasswordSource::Generated { .. });
    let password = service.reset(site, username, source)?;
    println!("Saved credentials for {site}.");
    if generated {
        println!("Generated password: {password}");
    }
    Ok(())
}

pub fn get(service: &VaultService, site: &str, reveal: bool) -> Result<(), CliError> {
    require_pin(service)?;
    let record = service.get(site)?;
    println!("Site:     {}", record.site);
    println!("Username: {}", record.username);
    println!(
        "Password: {}",
        if reveal { record.password.as_str() } else { MASKED }
    );
    Ok(())
}

pub fn check(service: &VaultService, site: &str) -> Result<(), CliError> {
    require_pin(service)?;
    match service.exists(site)? {
        (true, Some(username)) => println!("Credentials for {site} exist (username: {username})."),
        _ => println!("No credentials stored for {site}."),
    }
    Ok(())
}

pub fn delete(service: &VaultService, site: &str) -> Result<(), CliError> {
    require_pin(service)?;
    if service.delete(site)? {
        println!("Deleted credentials for {site}.");
    } else {
        println!("No credentials stored for {site}.");
    }
    Ok(())
}

/// Replace the password for `site`, keeping the stored username unless a
/// new one is given.
pub fn reset(
    service: &VaultService,
    site: &str,
    username: Option<&str>,
    source: PasswordSource,
) -> Result<(), CliError> {
    require_pin(service)?;
    let username = match username {
        Some(username) => username.to_string(),
        None => match service.exists(site)? {
            (true, Some(username)) => username,
            _ => {
                return Err(VaultError::NotFound {
                    site: site.to_string(),
                }
                .into());
            }
        },
    };
    let password = service.reset(site, &username, source)?;
    println!("Password for {site} reset.");
    println!("New password: {password}");
    Ok(())
}

pub fn rotate_keys(service: &VaultService) -> Result<(), CliError> {
    require_pin(service)?;
    service.rotate_keys()?;
    println!("Keys rotated. New fingerprint: {}", service.key_fingerprint()?);
    Ok(())
}

pub fn pin_set(service: &VaultService) -> Result<(), CliError> {
    require_pin(service)?;
    let pin = prompt::read_new_pin()?;
    service.set_pin(&pin)?;
    println!("PIN set.");
    Ok(())
}

pub fn pin_remove(service: &VaultService) -> Result<(), CliError> {
    require_pin(service)?;
    if service.remove_pin()? {
        println!("PIN removed.");
    } else {
        println!("No PIN configured.");
    }
    Ok(())
}

pub fn show_config(config: &LockboxConfig) -> Result<(), CliError> {
    print!("{}", lockbox_config::to_toml(config)?);
    Ok(())
}
