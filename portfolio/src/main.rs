use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use portfolio::commands::{
    contact::contact, email::EmailCommand, language::LanguageCommand, serve::serve,
};
use portfolio_utils::portfolio_version;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completion { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            env!("CARGO_BIN_NAME"),
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    init_tracing();

    match cli.command {
        Command::Serve => serve(load_config()?).await?,
        Command::Contact { endpoint } => contact(endpoint).await?,
        Command::Language {
            preferences,
            command,
        } => command.invoke(preferences)?,
        Command::Email { command } => command.invoke(load_config()?).await?,
        Command::CheckConfig { verbose } => {
            let config = load_config()?;
            verbose.then(|| println!("{config:#?}"));
        }
        Command::Completion { .. } => unreachable!(),
    }

    Ok(())
}

#[derive(Debug, Parser)]
#[command(version = portfolio_version())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the REST API server handling contact form submissions
    #[command(aliases(["run", "start", "r", "s"]))]
    Serve,
    /// Fill in and submit the contact form from the terminal
    #[command(aliases(["c"]))]
    Contact {
        /// Url of the contact form endpoint
        #[arg(
            long,
            env = "PORTFOLIO_CONTACT_ENDPOINT",
            default_value = "http://127.0.0.1:3000/api/send-email"
        )]
        endpoint: Url,
    },
    /// Show or change the display language
    #[command(aliases(["lang", "l"]))]
    Language {
        /// Path of the file storing user preferences
        #[arg(
            long,
            env = "PORTFOLIO_PREFERENCES",
            default_value = ".portfolio-preferences.json"
        )]
        preferences: PathBuf,
        #[command(subcommand)]
        command: LanguageCommand,
    },
    /// Test email deliverability
    #[command(aliases(["e"]))]
    Email {
        #[command(subcommand)]
        command: EmailCommand,
    },
    /// Validate configuration
    CheckConfig {
        /// Print a debug representation of the config
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}

fn load_config() -> anyhow::Result<portfolio_config::Config> {
    portfolio_config::load().context("Failed to load config")
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    #[cfg(tracing_pretty)]
    let fmt_layer = fmt_layer.pretty();

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(EnvFilter::from_default_env()))
        .init();
}
