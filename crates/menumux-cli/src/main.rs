use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use menumux_aggregate::{
    AggregateError, AggregationService, ErrorResponse, ItemRequest, StoreRequest,
};
use menumux_core::{load_app_config, Provider, StoreKind};
use menumux_providers::HttpProviderClient;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "menumux")]
#[command(about = "Merge store and item catalogs across delivery providers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge one store's menu across providers
    Store {
        /// Provider and native store id, e.g. `A=abc123`. Repeatable; the
        /// first entry with an id is the default provider.
        #[arg(
            long = "provider",
            value_name = "PROVIDER=ID",
            value_parser = parse_store_request,
            required = true
        )]
        providers: Vec<StoreRequest>,
        /// Fetch the retail (convenience store) page where a provider has one
        #[arg(long)]
        retail: bool,
    },
    /// Merge one item's details across providers
    Item {
        /// JSON array of `{provider, id, storeId?, sectionId?, subsectionId?}`;
        /// `-` reads standard input
        #[arg(long, default_value = "-")]
        input: PathBuf,
    },
}

/// Parses `PROVIDER=ID`. An empty id or `null` marks the provider as not
/// requested.
fn parse_store_request(raw: &str) -> Result<StoreRequest, String> {
    let (provider, native_id) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PROVIDER=ID, got \"{raw}\""))?;
    let provider = provider
        .trim()
        .parse::<Provider>()
        .map_err(|e| e.to_string())?;
    let native_id = native_id.trim();
    Ok(StoreRequest {
        provider,
        native_id: (!native_id.is_empty()).then(|| native_id.to_owned()),
    })
}

fn read_item_requests(input: &Path) -> anyhow::Result<Vec<ItemRequest>> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read item requests from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };
    parse_item_requests(&raw)
}

fn parse_item_requests(raw: &str) -> anyhow::Result<Vec<ItemRequest>> {
    serde_json::from_str(raw).context("item requests must be a JSON array of objects")
}

/// Renders an aggregation outcome as the JSON printed on stdout.
fn render<T: Serialize>(result: Result<T, AggregateError>) -> anyhow::Result<(String, ExitCode)> {
    match result {
        Ok(value) => Ok((serde_json::to_string_pretty(&value)?, ExitCode::SUCCESS)),
        Err(e) => {
            tracing::error!(error = %e, "aggregation failed");
            Ok(failure(&ErrorResponse::from(&e)))
        }
    }
}

/// Any failure that stops the command, rendered as the `{ "error" }` body.
fn failure(body: &ErrorResponse) -> (String, ExitCode) {
    let output = serde_json::to_string_pretty(body)
        .unwrap_or_else(|_| serde_json::json!({ "error": body.error }).to_string());
    (output, ExitCode::FAILURE)
}

async fn run(cli: Cli) -> anyhow::Result<(String, ExitCode)> {
    let config = load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = Arc::new(HttpProviderClient::from_config(&config)?);
    let ttl_secs = i64::try_from(config.token_default_ttl_secs)
        .context("MENUMUX_TOKEN_DEFAULT_TTL_SECS out of range")?;
    let ttl = chrono::Duration::try_seconds(ttl_secs)
        .context("MENUMUX_TOKEN_DEFAULT_TTL_SECS out of range")?;
    let service = AggregationService::new(client, ttl);

    match cli.command {
        Commands::Store { providers, retail } => {
            let kind = if retail {
                StoreKind::Retail
            } else {
                StoreKind::Restaurant
            };
            tracing::info!(providers = providers.len(), ?kind, "aggregating store");
            render(service.aggregate_store(&providers, kind).await)
        }
        Commands::Item { input } => {
            let requests = read_item_requests(&input)?;
            tracing::info!(providers = requests.len(), "aggregating item");
            render(service.aggregate_item(&requests).await)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let (output, code) = match run(cli).await {
        Ok(rendered) => rendered,
        Err(e) => failure(&ErrorResponse::new(format!("{e:#}"))),
    };
    println!("{output}");
    code
}
