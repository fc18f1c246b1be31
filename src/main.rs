//! fff — command-line client for the fantasy football stats API.

use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures::StreamExt;

use fff_client::api::{StatsParams, Weeks};
use fff_client::chat::ChatMessage;
use fff_client::client::ApiClient;
use fff_client::config::ClientConfig;
use fff_client::toasts::ToastStore;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query play-by-play stats
    Stats {
        #[arg(short = 'y', long, default_value_t = 2024)]
        year: u16,

        /// Filter by player name
        #[arg(long)]
        player: Option<String>,

        /// Filter by team
        #[arg(short = 't', long)]
        team: Option<String>,

        /// Filter by position
        #[arg(short = 'p', long)]
        position: Option<String>,

        /// Week number or range (e.g. 3 or 3-5)
        #[arg(short = 'w', long = "week", alias = "weeks")]
        weeks: Option<Weeks>,
    },
    /// Search players by name
    Players { search: String },
    /// Stream a chat completion to stdout
    Chat { prompt: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = ClientConfig::from_env()?;
    let toasts = ToastStore::new();
    let client = ApiClient::new(config, Arc::clone(&toasts))?;

    match args.command {
        Command::Stats {
            year,
            player,
            team,
            position,
            weeks,
        } => {
            let params = StatsParams {
                year: Some(year),
                player,
                position,
                weeks,
                team,
            };
            let rows = client.get_stats(&params).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Players { search } => {
            let rows = client.search_players(&search).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Chat { prompt } => {
            let prompt = prompt.join(" ");
            let mut stream = client.stream_chat(&[ChatMessage::user(prompt)]).await?;
            let mut stdout = std::io::stdout();
            while let Some(fragment) = stream.next().await {
                write!(stdout, "{}", fragment?)?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
    }

    Ok(())
}
