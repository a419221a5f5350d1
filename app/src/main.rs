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
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, ServeInput,
    ServeStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "mesabot")]
#[command(about = "Restaurant table-reservation bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the messaging webhook server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file (defaults to ~/mesabot/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Talk to the bot from the terminal
    Chat {
        /// Sender identity to use for the dialogue
        #[arg(short, long, default_value = "console:local")]
        sender: String,

        /// Send one message and exit. Sessions are not kept between runs, so
        /// this only answers a dialogue's opening message
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Config file (defaults to ~/mesabot/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Initialize configuration
    Init,
    /// Show effective configuration
    Info {
        /// Config file (defaults to ~/mesabot/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, config } => {
            ServeStrategy
                .execute(ServeInput {
                    config_path: config,
                    port,
                })
                .await
        }
        Commands::Chat {
            sender,
            message,
            config,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    config_path: config,
                    sender,
                    message,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info { config } => InfoStrategy.execute(config).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
