//! weather-assistant CLI
//!
//! Usage:
//!   weather-assistant                 # interactive prompt (same as `chat`)
//!   weather-assistant serve [-p port] # HTTP API on /api/weather
//!   weather-assistant mcp             # MCP server over stdio

use std::sync::Arc;

use anyhow::Result;
use argh::FromArgs;
use rmcp::ServiceExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_assistant::formatters::format_report;
use weather_assistant::http::{self, AppState};
use weather_assistant::mcp::WeatherMcp;
use weather_assistant::{Assistant, Config, RateLimiter};

/// Ask about the weather anywhere in the US
#[derive(FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Option<Command>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Chat(ChatArgs),
    Serve(ServeArgs),
    Mcp(McpArgs),
}

/// Interactive question/answer loop
#[derive(FromArgs)]
#[argh(subcommand, name = "chat")]
struct ChatArgs {}

/// Run the HTTP API
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
struct ServeArgs {
    /// port to listen on (default: PORT or 8080)
    #[argh(option, short = 'p')]
    port: Option<u16>,
}

/// Run an MCP server over stdio
#[derive(FromArgs)]
#[argh(subcommand, name = "mcp")]
struct McpArgs {}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_assistant=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Args = argh::from_env();
    let config = Config::load()?;
    let assistant = Assistant::from_config(&config)?;

    match args.command {
        None | Some(Command::Chat(_)) => run_chat(&assistant).await,
        Some(Command::Serve(serve)) => {
            let port = serve.port.unwrap_or(config.port);
            if config.api_key.is_empty() {
                tracing::warn!("API_KEY is not set; every request will be rejected");
            }
            let state = AppState::new(
                assistant,
                RateLimiter::new(config.rate_limit),
                config.api_key.as_str(),
            );
            http::serve(state, port).await
        }
        Some(Command::Mcp(_)) => {
            tracing::info!("Starting MCP weather server");

            let server = WeatherMcp::new(Arc::new(assistant))
                .serve(rmcp::transport::stdio())
                .await?;
            server.waiting().await?;

            tracing::info!("Server shutdown complete");
            Ok(())
        }
    }
}

async fn run_chat(assistant: &Assistant) -> Result<()> {
    let heavy = "═".repeat(50);
    let light = "─".repeat(50);
    println!("\n{heavy}\nWeather Assistant\n{light}");
    println!("Type 'quit' to exit");
    println!("Ask me about the weather anywhere in the US!");
    println!("Example: 'What's the weather like in Miami?'\n{heavy}");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") {
            println!("\nGoodbye!");
            break;
        }

        match assistant.ask(query).await {
            Ok(report) => print!("{}", format_report(&report)),
            Err(e) => println!("\nError: {e}"),
        }
    }
    Ok(())
}
