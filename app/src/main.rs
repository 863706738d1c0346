#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    CommandStrategy, ExtractInput, ExtractStrategy, InitStrategy, ListInput, ListStrategy,
    RenderInput, RenderStrategy, TelegramInput, TelegramStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "taglens")]
#[command(about = "Extract hidden tag sections from character bot replies", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/taglens/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Telegram {
        /// Bot token (overrides config)
        #[arg(short, long)]
        token: Option<String>,

        /// Allowed chat IDs (overrides config)
        #[arg(short, long, value_delimiter = ',')]
        allow_from: Option<Vec<String>>,
    },
    /// Print the tag contents found in a reply
    Extract {
        /// Only extract this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Reply file (reads stdin if omitted)
        file: Option<PathBuf>,
    },
    /// Render a configured command against a reply
    Render {
        /// Configured command name
        #[arg(short = 'n', long = "command")]
        command: String,

        /// Reply file (reads stdin if omitted)
        file: Option<PathBuf>,
    },
    /// List configured tag variables
    Tags,
    /// List configured commands
    Commands,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Commands::Telegram { token, allow_from } => {
            TelegramStrategy
                .execute(TelegramInput {
                    config,
                    token,
                    allow_from,
                })
                .await
        }
        Commands::Extract { tag, file } => {
            ExtractStrategy
                .execute(ExtractInput { config, tag, file })
                .await
        }
        Commands::Render { command, file } => {
            RenderStrategy
                .execute(RenderInput {
                    config,
                    command,
                    file,
                })
                .await
        }
        Commands::Tags => ListStrategy.execute(ListInput::Tags(config)).await,
        Commands::Commands => ListStrategy.execute(ListInput::Commands(config)).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
