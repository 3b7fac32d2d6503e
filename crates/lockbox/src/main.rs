// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lockbox - a local envelope-encrypted password vault.
//!
//! This is the binary entry point. Every subcommand goes through the
//! `VaultService` facade in `lockbox-vault`.

mod commands;
mod error;
mod prompt;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use lockbox_config::LockboxConfig;
use lockbox_vault::VaultService;

use crate::error::{CliError, EXIT_FATAL, EXIT_OK};

/// Lockbox - a local envelope-encrypted password vault.
#[derive(Parser, Debug)]
#[command(name = "lockbox", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the key set and an empty vault. Safe to run repeatedly.
    Init,
    /// Print a freshly generated password without storing it.
    Generate(GenerateArgs),
    /// Store credentials for a site, generating a password unless one is given.
    Save {
        site: String,
        username: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Show the credentials stored for a site.
    Get {
        site: String,
        /// Print the password instead of a mask.
        #[arg(long)]
        reveal: bool,
    },
    /// Report whether credentials exist for a site.
    Check { site: String },
    /// Remove the credentials stored for a site.
    Delete { site: String },
    /// Replace the password for a site.
    Reset {
        site: String,
        /// New username. Defaults to the stored one.
        #[arg(short, long)]
        username: Option<String>,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Generate new keys and re-encrypt the vault and PIN under them.
    RotateKeys,
    /// Manage the PIN that gates vault access.
    Pin {
        #[command(subcommand)]
        action: PinCommand,
    },
    /// Show key store and vault state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

impl Commands {
    /// Whether the command reads or writes vault data.
    fn needs_key_store(&self) -> bool {
        !matches!(
            self,
            Self::Init | Self::Generate(_) | Self::Status { .. } | Self::Config
        )
    }
}

#[derive(Subcommand, Debug)]
enum PinCommand {
    /// Set or change the PIN.
    Set,
    /// Remove the PIN.
    Remove,
}

/// Password generation options.
#[derive(Args, Debug)]
struct GenerateArgs {
    /// Password length. Defaults to `generator.default_length`.
    #[arg(short, long)]
    length: Option<usize>,
    /// Exclusions: class letters (l, u, d, p), then a space and any
    /// individual characters to leave out, e.g. "p" or "l #$%".
    #[arg(short = 'x', long, value_name = "EXCLUSIONS")]
    exclude: Option<String>,
}

#[derive(Args, Debug)]
struct PasswordArgs {
    /// Use this password instead of generating one.
    #[arg(short, long, conflicts_with_all = ["length", "exclude"])]
    password: Option<String>,
    /// Prompt for the password on the terminal.
    #[arg(long, conflicts_with_all = ["password", "length", "exclude"])]
    prompt: bool,
    #[command(flatten)]
    generate: GenerateArgs,
}

impl PasswordArgs {
    fn into_source(
        self,
        site: &str,
        config: &LockboxConfig,
    ) -> Result<lockbox_vault::PasswordSource, CliError> {
        let password = if self.prompt {
            Some(prompt::read_password(site)?)
        } else {
            self.password
        };
        Ok(commands::password_source(
            password,
            self.generate.length,
            self.generate.exclude.as_deref(),
            config.generator.default_length,
        )?)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => lockbox_config::load_and_validate_path(path),
        None => lockbox_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            lockbox_config::render_errors(&errors);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    init_tracing(&config.logging.level);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(command: Commands, config: &LockboxConfig) -> Result<(), CliError> {
    let service = VaultService::new(config);

    // A first run gets its key set here; `init` reports the outcome itself.
    if command.needs_key_store() {
        service.initialize()?;
    }

    match command {
        Commands::Init => commands::init(&service),
        Commands::Generate(args) => {
            commands::generate(&service, config, args.length, args.exclude.as_deref())
        }
        Commands::Save {
            site,
            username,
            password,
        } => {
            let source = password.into_source(&site, config)?;
            commands::save(&service, &site, &username, source)
        }
        Commands::Get { site, reveal } => commands::get(&service, &site, reveal),
        Commands::Check { site } => commands::check(&service, &site),
        Commands::Delete { site } => commands::delete(&service, &site),
        Commands::Reset {
            site,
            username,
            password,
        } => {
            let source = password.into_source(&site, config)?;
            commands::reset(&service, &site, username.as_deref(), source)
        }
        Commands::RotateKeys => commands::rotate_keys(&service),
        Commands::Pin { action } => match action {
            PinCommand::Set => commands::pin_set(&service),
            PinCommand::Remove => commands::pin_remove(&service),
        },
        Commands::Status { json } => status::run_status(&service, &config.storage.data_dir, json),
        Commands::Config => commands::show_config(config),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr
/// so command output on stdout stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lockbox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
