//! Identity server.
//!
//! Loads configuration, selects the identity backend and answers user
//! lookups through the directory resolver.

mod backend;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use directory_resolver::DirectoryResolver;
use serde::Serialize;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "identity-server", version, about = "Resolve identity provider users from the directory")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a subject identifier (`DOMAIN\login`).
    Find { subject: String },
    /// Search users by first name, last name or login prefix.
    Search { text: String },
    /// Print the requested claims of a subject.
    Profile {
        subject: String,
        /// Claim type to include; repeatable.
        #[arg(long = "claim")]
        claims: Vec<String>,
    },
    /// Validate configuration and print it with secrets redacted.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    run(cli.command, &config).await
}

async fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    let backend = backend::select(config)?;
    tracing::info!(storage_provider = %backend.provider, "identity backend configured");

    let resolver = DirectoryResolver::init(&backend.settings, &config.resolver, backend.connector);
    let client = resolver.client();

    match command {
        Command::Find { subject } => print_json(&client.find_by_subject_id(&subject).await),
        Command::Search { text } => print_json(&client.search_users(&text).await),
        Command::Profile { subject, claims } => {
            print_json(&resolver.profiles().profile_claims(&subject, &claims).await)
        }
        Command::CheckConfig => print_json(config),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_profile_with_repeated_claims() {
        let cli = Cli::try_parse_from([
            "identity-server",
            "--config",
            "identity.yaml",
            "profile",
            r"EXAMPLE\test.user",
            "--claim",
            "email",
            "--claim",
            "role",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("identity.yaml")));
        match cli.command {
            Command::Profile { subject, claims } => {
                assert_eq!(subject, r"EXAMPLE\test.user");
                assert_eq!(claims, ["email", "role"]);
            }
            _ => panic!("expected profile command"),
        }
    }

    #[tokio::test]
    async fn in_memory_commands_run() {
        let mut config = AppConfig::default();
        config.static_directory.users =
            vec![static_directory_plugin::config::StaticUser::new("test", "user")];

        run(Command::Find { subject: r"EXAMPLE\test.user".to_owned() }, &config)
            .await
            .unwrap();
        run(Command::Search { text: "te".to_owned() }, &config).await.unwrap();
        run(Command::CheckConfig, &config).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_backend_fails_every_command() {
        let config = AppConfig {
            storage_provider: "mongodb".to_owned(),
            ..AppConfig::default()
        };
        assert!(run(Command::CheckConfig, &config).await.is_err());
    }
}
