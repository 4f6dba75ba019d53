#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Shutter access tool
//!
//! Loads the access configuration from the environment (and `.env`) and exposes
//! the checks the server performs per request, plus a helper to hash the admin
//! password for configuration.

use std::io::BufRead;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use shutter_auth::{hash_password, AccessControl, DEFAULT_BCRYPT_COST};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shutter-access", version, about = "Inspect and test instance access settings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective access configuration as JSON
    Status,
    /// Read a password from stdin and print its bcrypt hash
    HashPassword {
        #[arg(long, default_value_t = DEFAULT_BCRYPT_COST)]
        cost: u32,
    },
    /// Read a password from stdin and check it against the admin password
    CheckPassword,
    /// Print the download token
    ///
    /// Without SHUTTER_DOWNLOAD_TOKEN every invocation issues a fresh random token.
    DownloadToken,
    /// Print the preview token
    PreviewToken,
    /// Check a token for the given scope
    ///
    /// Download tokens can only match when SHUTTER_DOWNLOAD_TOKEN is set, since each
    /// invocation is a separate process.
    CheckToken {
        #[arg(long, value_enum)]
        scope: Scope,
        token: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    Download,
    Preview,
}

fn read_stdin_line() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn verdict(accepted: bool) -> bool {
    println!("{}", if accepted { "accepted" } else { "rejected" });
    accepted
}

/// Warn when the download token only lives as long as this process
fn warn_if_ephemeral(access: &AccessControl) -> bool {
    let ephemeral = !access.status().download_token_static;
    if ephemeral {
        tracing::warn!(
            "SHUTTER_DOWNLOAD_TOKEN is not set, the download token is random per invocation"
        );
    }
    ephemeral
}

fn run(
    command: Command,
    load: impl FnOnce() -> anyhow::Result<AccessControl>,
    mut read_line: impl FnMut() -> anyhow::Result<String>,
) -> anyhow::Result<bool> {
    let success = match command {
        Command::HashPassword { cost } => {
            println!("{}", hash_password(&read_line()?, cost)?);
            true
        }
        Command::Status => {
            let access = load()?;
            println!("{}", serde_json::to_string_pretty(&access.status())?);
            true
        }
        Command::CheckPassword => {
            let access = load()?;
            if !access.requires_auth() {
                tracing::warn!("Instance is public, the admin password is not required");
            }
            verdict(access.check_password(&read_line()?))
        }
        Command::DownloadToken => {
            let access = load()?;
            warn_if_ephemeral(&access);
            println!("{}", access.download_token());
            true
        }
        Command::PreviewToken => {
            let access = load()?;
            println!("{}", access.preview_token());
            true
        }
        Command::CheckToken { scope, token } => {
            let access = load()?;
            warn_if_ephemeral(&access);
            match scope {
                Scope::Download => verdict(!access.is_invalid_download_token(&token)),
                Scope::Preview => verdict(!access.is_invalid_preview_token(&token)),
            }
        }
    };

    Ok(success)
}

fn load_access() -> anyhow::Result<AccessControl> {
    let access = AccessControl::from_env().context("Invalid access configuration")?;
    tracing::debug!(mode = %access.effective_mode(), "Configuration loaded");
    Ok(access)
}

fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shutter_auth=debug,shutter_access=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if run(cli.command, load_access, read_stdin_line)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
