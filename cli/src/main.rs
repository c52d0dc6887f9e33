//! Saathi CLI binary: chat with the carbon advisor or run the API server.
//!
//! Subcommands: `chat` (interactive REPL against Gemini), `serve` (HTTP API).

mod repl;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use saathi::lookup::{MarketClient, NewsClient, WeatherClient};
use saathi::{Advisor, ChatGemini, GenerationConfig};
use serve::{AppState, LookupClients, SqliteProduceStore};

const DEFAULT_SERVE_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_PRODUCE_DB: &str = "saathi.db";

#[derive(Parser, Debug)]
#[command(name = "saathi")]
#[command(about = "Saathi — conversational farm-carbon advisor")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Interactive chat: type a message per line, Ctrl+D or `quit` to exit
    Chat(ChatArgs),
    /// Run the HTTP API server (default 127.0.0.1:8000)
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct ChatArgs {
    /// Model name (default gemini-2.0-flash)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Sampling temperature (default 1.0)
    #[arg(long, value_name = "FLOAT")]
    temperature: Option<f32>,

    /// Load and save the conversation in this file, resuming it across runs
    #[arg(long, value_name = "PATH")]
    history: Option<std::path::PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
struct ServeArgs {
    /// Listen address
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_SERVE_ADDR)]
    addr: String,

    /// Path to the produce-listing database
    #[arg(long, value_name = "PATH", env = "SAATHI_PRODUCE_DB", default_value = DEFAULT_PRODUCE_DB)]
    produce_db: String,
}

fn build_advisor(
    keys: &config::ApiKeys,
    model: Option<&str>,
    temperature: Option<f32>,
) -> Result<Advisor, Box<dyn std::error::Error>> {
    let api_key = keys.require_gemini()?;
    let mut llm = ChatGemini::new(api_key)?;
    if let Some(model) = model {
        llm = llm.with_model(model);
    }
    let mut advisor = Advisor::new(Arc::new(llm));
    if let Some(temperature) = temperature {
        advisor = advisor.with_generation(GenerationConfig {
            temperature,
            ..GenerationConfig::default()
        });
    }
    Ok(advisor)
}

/// Builds lookup clients when all three provider keys are present. On a partial
/// config the lookup routes answer 503 and the chat API still works.
fn build_lookups(keys: &config::ApiKeys) -> Option<LookupClients> {
    match (&keys.weather, &keys.newsapi, &keys.govdata) {
        (Some(weather), Some(newsapi), Some(govdata)) => Some(LookupClients {
            weather: WeatherClient::new(weather.clone()),
            news: NewsClient::new(newsapi.clone()),
            market: MarketClient::new(govdata.clone()),
        }),
        _ => {
            warn!("lookup API keys missing; weather/news/prices routes will answer 503");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = config::load_and_apply("saathi", None) {
        warn!(error = %e, "could not load configuration files, using process env only");
    }
    let keys = config::ApiKeys::from_env();

    let args = Args::parse();
    match args.cmd {
        Command::Chat(chat_args) => {
            let advisor = build_advisor(&keys, chat_args.model.as_deref(), chat_args.temperature)?;
            repl::run_chat_loop(&advisor, chat_args.history.as_deref()).await
        }
        Command::Serve(serve_args) => {
            let advisor = build_advisor(&keys, None, None)?;
            let produce = Arc::new(SqliteProduceStore::new(&serve_args.produce_db)?);
            let state = Arc::new(AppState::new(advisor, build_lookups(&keys), produce));
            serve::run_serve(Some(&serve_args.addr), state)
                .await
                .map_err(|e| -> Box<dyn std::error::Error> { e.to_string().into() })
        }
    }
}
