//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use smartreview_core::api::BackendClient;
use smartreview_core::config::Config;
use smartreview_core::session::SessionStore;

mod commands;

#[derive(Parser)]
#[command(name = "smartreview")]
#[command(version = "0.1")]
#[command(about = "SmartReview client: GitHub sign-in, App installs, and API key setup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with GitHub (OAuth)
    Login,
    /// Sign out and clear the local session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Install SmartReview on your repositories (requires sign-in)
    Install,
    /// List GitHub App installations
    Installations,
    /// Manage the Groq API key used for reviews
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(clap::Subcommand)]
enum KeyCommands {
    /// Show whether an API key is stored
    Status,
    /// Store (or replace) the API key
    Set {
        /// The key; prompted for when omitted
        #[arg(value_name = "API_KEY")]
        key: Option<String>,
    },
    /// Delete the stored API key
    Delete {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    let backend = BackendClient::new(config.server_url()?);
    let mut session = SessionStore::load().context("load session")?;

    match cli.command {
        Commands::Login => commands::auth::login(&backend, &mut session).await,
        Commands::Logout => commands::auth::logout(&backend, &mut session).await,
        Commands::Whoami => commands::auth::whoami(&backend, &mut session).await,
        Commands::Install => commands::install::start(&backend, &mut session).await,
        Commands::Installations => commands::install::list(&backend, &mut session).await,
        Commands::Key { command } => match command {
            KeyCommands::Status => commands::key::status(&backend, &mut session).await,
            KeyCommands::Set { key } => commands::key::set(&backend, &mut session, key).await,
            KeyCommands::Delete { yes } => {
                commands::key::delete(&backend, &mut session, yes).await
            }
        },
    }
}
