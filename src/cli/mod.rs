//! # Command Line Interface
//!
//! One-shot commands for each vault operation, plus `serve`, which reads
//! newline-delimited JSON requests from stdin and answers each with one JSON
//! envelope on stdout.

pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, Instrument};

use crate::config::VaultClientConfig;
use crate::observability::init_logging;
use crate::router::{Request, Response, VaultRouter};
use crate::unlock::{FileUnlockStore, MemoryUnlockStore, UnlockConfigStore};
use crate::vault::{AliasMode, SecretString};
use output::{print_output, OutputFormat};

#[derive(Parser)]
#[command(name = "vaultlink")]
#[command(about = "Resolve and provision website credentials from a local vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the vault HTTP API
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Path of the unlock passphrase record
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Keep the unlock passphrase in memory only
    #[arg(long, global = true, conflicts_with = "store")]
    pub memory_store: bool,

    /// Output format for one-shot commands
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Unlock the vault and remember the passphrase for automatic re-unlock
    Unlock {
        /// Passphrase (read from the first line of stdin when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Use the legacy hash instead of the strong one
        #[arg(long)]
        weak_hash: bool,
    },

    /// Lock the vault
    Lock,

    /// Create an alias, password, identity and secret for a site
    Provision {
        /// Site hostname
        hostname: String,

        /// Display name for the identity
        #[arg(long)]
        name: Option<String>,

        /// Generated password length
        #[arg(long)]
        length: Option<usize>,

        /// Alias generation mode
        #[arg(long)]
        mode: Option<AliasMode>,
    },

    /// Look up the stored credential for a site
    Retrieve {
        /// Site hostname
        hostname: String,
    },

    /// Check that the vault answers
    Health,

    /// Serve newline-delimited JSON requests on stdin/stdout
    Serve,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let config = resolve_config(&cli)?;
    let store = resolve_store(&cli, &config);
    let router = VaultRouter::new(&config, store).context("Failed to create vault client")?;
    debug!(base_url = %router.transport().base_url(), "Vault client ready");

    let request = match cli.command {
        Commands::Serve => return serve(&router).await,
        Commands::Unlock { password, weak_hash } => {
            let password = match password {
                Some(password) => password,
                None => read_passphrase().await?,
            };
            Request::Unlock { password: SecretString::new(password), use_strong_hash: !weak_hash }
        }
        Commands::Lock => Request::Lock,
        Commands::Provision { hostname, name, length, mode } => {
            Request::Provision { hostname, display_name: name, password_length: length, mode }
        }
        Commands::Retrieve { hostname } => Request::Retrieve { hostname },
        Commands::Health => Request::HealthCheck,
    };

    let span = crate::vault_span!(request.action());
    let response = router.handle(request).instrument(span).await;
    print_output(&response, cli.output)?;

    if !response.ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Defaults, then environment, then flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<VaultClientConfig> {
    let mut config = VaultClientConfig::from_env().context("Invalid vault configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_seconds = timeout;
    }
    if let Some(store) = &cli.store {
        config.unlock_store_path = Some(store.clone());
    }
    config.validate().context("Invalid vault configuration")?;
    Ok(config)
}

fn resolve_store(cli: &Cli, config: &VaultClientConfig) -> Arc<dyn UnlockConfigStore> {
    if cli.memory_store {
        return Arc::new(MemoryUnlockStore::new());
    }
    let path = config.unlock_store_path.clone().unwrap_or_else(FileUnlockStore::default_path);
    debug!(path = %path.display(), "Using file unlock store");
    Arc::new(FileUnlockStore::new(path))
}

async fn read_passphrase() -> anyhow::Result<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read passphrase from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Answer one envelope per input line until stdin closes.
async fn serve(router: &VaultRouter) -> anyhow::Result<()> {
    info!("Serving vault requests on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = router.handle_json(line).await;
        write_response(&mut stdout, &response).await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

async fn write_response(
    stdout: &mut tokio::io::Stdout,
    response: &Response,
) -> anyhow::Result<()> {
    let mut out = serde_json::to_vec(response).context("Failed to serialize response")?;
    out.push(b'\n');
    if let Err(e) = stdout.write_all(&out).await {
        error!(error = %e, "Failed to write to stdout");
        return Err(e.into());
    }
    stdout.flush().await.context("Failed to flush stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_provision() {
        let cli = Cli::try_parse_from([
            "vaultlink",
            "--base-url",
            "http://127.0.0.1:7000",
            "provision",
            "example.com",
            "--name",
            "Alice",
            "--length",
            "20",
            "--mode",
            "uuid",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:7000"));
        match cli.command {
            Commands::Provision { hostname, name, length, mode } => {
                assert_eq!(hostname, "example.com");
                assert_eq!(name.as_deref(), Some("Alice"));
                assert_eq!(length, Some(20));
                assert_eq!(mode, Some(AliasMode::Uuid));
            }
            _ => panic!("expected provision"),
        }
    }

    #[test]
    fn test_store_flags_conflict() {
        assert!(Cli::try_parse_from(["vaultlink", "--store", "x.json", "--memory-store", "health"])
            .is_err());
    }
}
